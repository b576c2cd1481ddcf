//! Mind map: a generated tree over the article (root = topic, children =
//! subtopics). Validated once at creation, read-only afterwards; `advance`
//! is unsupported for this mode.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::MindMapNode;
use crate::error::{CoreError, Result};

/// Bounds on what we accept from the generator. Anything deeper or larger
/// is treated as a malformed generation, not a learner error.
const MAX_DEPTH: usize = 6;
const MAX_NODES: usize = 200;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MindMapState {
  root: MindMapNode,
}

impl MindMapState {
  /// Accept a generated tree after structural validation: exactly one root,
  /// unique node ids (a repeated id means a node is its own ancestor in the
  /// id graph, i.e. a cycle), non-empty texts, bounded depth and size.
  pub fn validate(root: MindMapNode) -> Result<Self> {
    let mut seen = HashSet::<String>::new();
    let mut count = 0usize;

    let mut stack: Vec<(&MindMapNode, usize)> = vec![(&root, 1)];
    while let Some((node, depth)) = stack.pop() {
      count += 1;
      if count > MAX_NODES {
        return Err(CoreError::GenerationInvalid(format!(
          "mind map exceeds {MAX_NODES} nodes"
        )));
      }
      if depth > MAX_DEPTH {
        return Err(CoreError::GenerationInvalid(format!(
          "mind map exceeds depth {MAX_DEPTH}"
        )));
      }
      if node.id.trim().is_empty() || node.text.trim().is_empty() {
        return Err(CoreError::GenerationInvalid("mind map node with empty id or text".into()));
      }
      if !seen.insert(node.id.clone()) {
        return Err(CoreError::GenerationInvalid(format!(
          "mind map node id '{}' appears twice (cycle)",
          node.id
        )));
      }
      for child in &node.children {
        stack.push((child, depth + 1));
      }
    }

    Ok(Self { root })
  }

  pub fn root(&self) -> &MindMapNode {
    &self.root
  }
}
