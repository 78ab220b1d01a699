//! Topic suggestion engine — contextual follow-up prompts.
//!
//! Scans the latest user utterance against a fixed-priority table of
//! keyword groups; the first matching group selects its prompt pool. With
//! no match the last known topic is reused, else a generic pool. Not wired
//! into the live reply path (the backend supplies follow-ups there), but
//! kept as an independently testable component.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Consultation topics, in detection priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    Marriage,
    Career,
    Health,
    Finance,
    Education,
    Travel,
    Property,
    Children,
}

/// Ordered (topic, keywords) table. Evaluated top to bottom; first group
/// with a substring match wins.
const TOPIC_TABLE: &[(Topic, &[&str])] = &[
    (
        Topic::Marriage,
        &["marriage", "shaadi", "shadi", "vivah", "rishta", "wedding"],
    ),
    (
        Topic::Career,
        &["career", "job", "naukri", "business", "promotion", "rozi"],
    ),
    (
        Topic::Health,
        &["health", "swasthya", "bimari", "illness", "disease"],
    ),
    (
        Topic::Finance,
        &["finance", "money", "wealth", "paisa", "dhan", "loan"],
    ),
    (
        Topic::Education,
        &["education", "padhai", "study", "exam", "degree"],
    ),
    (
        Topic::Travel,
        &["travel", "yatra", "videsh", "abroad", "foreign"],
    ),
    (
        Topic::Property,
        &["property", "ghar", "makan", "land", "zameen"],
    ),
    (
        Topic::Children,
        &["children", "child", "santan", "baby", "bacche"],
    ),
];

const MARRIAGE_PROMPTS: &[&str] = &[
    "Kya aapke rishte ki baat chal rahi hai?",
    "Kya aap marriage ke liye ready hain ya koi specific concerns hain?",
    "Aapke family mein koi pressure hai marriage ke liye?",
    "Aapke partner ke saath kya issues hain jo solve karni hain?",
];

const CAREER_PROMPTS: &[&str] = &[
    "Aapka current job role kya hai aur kya aap usse satisfied hain?",
    "Kya aap job change ya promotion ke baare mein soch rahe hain?",
    "Kya aap koi naya business start karna chahte hain?",
    "Aapke career goals kya hain jo aap achieve karna chahte hain?",
];

const HEALTH_PROMPTS: &[&str] = &[
    "Aapko koi specific health issues hain jo aapko pareshan kar rahe hain?",
    "Kya aap stress ya anxiety se deal kar rahe hain?",
    "Aapki sleep pattern kaise hai?",
];

const FINANCE_PROMPTS: &[&str] = &[
    "Kya aap kisi financial problem ka saamna kar rahe hain?",
    "Aapke savings aur investments ki situation kaisi hai?",
    "Kya aap koi bada kharcha ya investment plan kar rahe hain?",
];

const EDUCATION_PROMPTS: &[&str] = &[
    "Aap kis field mein padhai kar rahe hain?",
    "Kya aap higher studies ke baare mein soch rahe hain?",
    "Kya exams ko lekar koi chinta hai?",
];

const TRAVEL_PROMPTS: &[&str] = &[
    "Kya aap videsh jaane ka plan kar rahe hain?",
    "Kya aapka travel kaam ke liye hai ya settlement ke liye?",
];

const PROPERTY_PROMPTS: &[&str] = &[
    "Kya aap ghar ya zameen kharidne ka soch rahe hain?",
    "Kya property ko lekar koi vivaad chal raha hai?",
];

const CHILDREN_PROMPTS: &[&str] = &[
    "Kya aap santan prapti ke baare mein jaanna chahte hain?",
    "Aapke bacchon ki padhai ya future ko lekar koi sawaal hai?",
];

const GENERIC_PROMPTS: &[&str] = &[
    "Aapke man mein aur kya sawaal hai jiska jawab aap chahte hain?",
    "Kya aap koi specific problem face kar rahe hain jo solve karna chahte hain?",
    "Aapke life mein koi major changes aane wale hain?",
    "Kya aap koi important decision lene wale hain?",
];

/// Rolling context the engine consults when the latest utterance has no
/// topic keyword.
#[derive(Debug, Clone, Default)]
pub struct TopicContext {
    pub last_topic: Option<Topic>,
}

/// Detect the first matching topic for an utterance, in table order.
pub fn detect(text: &str) -> Option<Topic> {
    let lower = text.to_lowercase();
    TOPIC_TABLE
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(topic, _)| *topic)
}

/// The prompt pool for a topic.
pub fn pool(topic: Topic) -> &'static [&'static str] {
    match topic {
        Topic::Marriage => MARRIAGE_PROMPTS,
        Topic::Career => CAREER_PROMPTS,
        Topic::Health => HEALTH_PROMPTS,
        Topic::Finance => FINANCE_PROMPTS,
        Topic::Education => EDUCATION_PROMPTS,
        Topic::Travel => TRAVEL_PROMPTS,
        Topic::Property => PROPERTY_PROMPTS,
        Topic::Children => CHILDREN_PROMPTS,
    }
}

/// Produce a follow-up prompt for the utterance, updating the context with
/// any freshly detected topic. Selection within the pool is uniform random.
pub fn suggest(user_text: &str, context: &mut TopicContext) -> String {
    let pool = match detect(user_text) {
        Some(topic) => {
            context.last_topic = Some(topic);
            self::pool(topic)
        }
        None => match context.last_topic {
            Some(topic) => self::pool(topic),
            None => GENERIC_PROMPTS,
        },
    };
    let mut rng = rand::thread_rng();
    (*pool.choose(&mut rng).expect("prompt pools are non-empty")).to_string()
}
