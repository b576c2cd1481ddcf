//! Seed data: built-in articles that keep the backend useful even without
//! an external config bank.

use crate::domain::Article;

/// Minimal set of built-in articles, a couple per category.
pub fn seed_articles() -> Vec<Article> {
  vec![
    Article {
      id: "a101".into(),
      category: "business".into(),
      title: "Small bakeries turn to subscriptions".into(),
      body: "Independent bakeries across the country are trying a new way to \
             survive rising costs. Instead of waiting for customers to walk \
             in, many now sell monthly subscriptions. Members pay in advance \
             and collect fresh bread every week. Owners say the model makes \
             their income predictable and reduces waste, because they know \
             exactly how many loaves to prepare. Some economists warn that \
             subscriptions can fail quickly if households cut spending during \
             a downturn. Even so, several bakery owners report that loyal \
             members recommend the service to neighbours, and that the steady \
             revenue helped them negotiate better prices with flour suppliers."
        .into(),
    },
    Article {
      id: "a102".into(),
      category: "business".into(),
      title: "Why more offices are shrinking".into(),
      body: "Large companies continue to reduce the amount of office space \
             they rent. Since many employees now work from home part of the \
             week, empty desks have become an expensive problem. Landlords in \
             several cities offer generous discounts to keep tenants, while \
             some buildings are converted into apartments. Analysts believe \
             the trend will continue while remote work remains popular, \
             although a few firms have ordered staff back full time. For \
             smaller businesses the change is an opportunity, because space \
             that used to be unaffordable is suddenly within reach."
        .into(),
    },
    Article {
      id: "a201".into(),
      category: "technology".into(),
      title: "Old phones get a second life as sensors".into(),
      body: "Researchers have found a practical use for millions of discarded \
             smartphones. With a simple software update, an old device can \
             become an environmental sensor that measures noise, light and \
             air quality. Volunteers attach the phones to balconies and \
             street lamps, where they quietly collect data for city planners. \
             The approach is cheap compared with professional equipment, and \
             it keeps electronic waste out of landfills a little longer. \
             Critics point out that ageing batteries remain a fire risk, so \
             the project replaces them with small solar panels wherever \
             possible."
        .into(),
    },
    Article {
      id: "a301".into(),
      category: "science".into(),
      title: "City gardens help bees through dry summers".into(),
      body: "A new study suggests that small city gardens play a surprising \
             role in protecting bees. During long dry periods, flowers in the \
             countryside disappear earlier than those in towns, where people \
             water their plants. Scientists counted insects in more than two \
             hundred gardens and found activity there remained stable even in \
             drought years. The authors encourage residents to plant simple, \
             open flowers and to avoid pesticides. They also note that a \
             variety of plants blooming at different times offers the most \
             reliable food supply for pollinators across the whole season."
        .into(),
    },
  ]
}
