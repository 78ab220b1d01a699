//! Remedy suggestions appended to replies when the user voices a problem.
//!
//! Keyword-routed catalogue of one free remedy plus buyable items per
//! problem area, with an activation note. Only added when the utterance
//! actually expresses a problem or pain, never for neutral questions.

/// Problem areas the catalogue covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemedyArea {
    Career,
    Love,
    Marriage,
    Children,
    Property,
    Litigation,
    Finance,
    General,
}

struct RemedySet {
    category_name: &'static str,
    free: &'static str,
    buyable: &'static [&'static str],
}

const ACTIVATION: &str = "Apne item ko pehenne se pehle, usey Ganga Jal ya kachche doodh se \
saaf karein aur dhoop mein energize karein. Is dauran 'Om Namah Shivaya' ka 11 baar jaap karein.";

/// Markers that indicate the user is describing a problem rather than
/// asking a neutral question.
const PROBLEM_MARKERS: &[&str] = &[
    "problem",
    "issue",
    "dikkat",
    "pareshani",
    "musibat",
    "delay",
    "deri",
    "nahi mil",
    "nahi ho",
    "stuck",
    "loss",
    "court",
    "case",
    "breakup",
    "bimari",
    "tension",
    "worried",
    "anxiety",
    "stress",
    "chinta",
    "fikar",
];

/// Keyword routing table, evaluated in order.
const AREA_TABLE: &[(RemedyArea, &[&str])] = &[
    (
        RemedyArea::Career,
        &["job", "business", "career", "naukri", "rozi", "work"],
    ),
    (
        RemedyArea::Love,
        &["partner", "relationship", "love", "pyaar"],
    ),
    (
        RemedyArea::Marriage,
        &["marriage", "shadi", "shaadi", "vivah"],
    ),
    (
        RemedyArea::Children,
        &["child", "santan", "baby", "bacche"],
    ),
    (
        RemedyArea::Property,
        &["property", "home", "land", "ghar", "zameen"],
    ),
    (RemedyArea::Litigation, &["court case", "litigation", "case"]),
    (
        RemedyArea::Finance,
        &["money", "finance", "wealth", "paisa"],
    ),
];

fn remedy_set(area: RemedyArea) -> RemedySet {
    match area {
        RemedyArea::Career => RemedySet {
            category_name: "Career aur Business",
            free: "Har subah, copper ke bartan se Surya Dev ko jal arpit karein (Surya Arghya).",
            buyable: &[
                "Pyrite Bracelet: Aapke career aur dhan ki growth mein madad karta hai.",
                "Tiger Eye Bracelet: Aapko himmat aur focus deta hai.",
            ],
        },
        RemedyArea::Love => RemedySet {
            category_name: "Love aur Relationship",
            free: "Shukrawar ki shaam ko peepal ke ped ko doodh aur jal arpit karein.",
            buyable: &[
                "Rose Quartz Bracelet: Pyaar aur achhe rishton ko aakarshit karta hai.",
                "Gauri Shankar Rudraksha: Jeevan saathi ke saath bandhan mazboot karta hai.",
            ],
        },
        RemedyArea::Marriage => RemedySet {
            category_name: "Marriage aur Compatibility",
            free: "Guruwar ka vrat rakhein ya gau mata ko hara chara khilayein.",
            buyable: &[
                "Gauri Shankar Rudraksha: Vivah mein deri door karta hai.",
                "Shukra Yantra: Prem aur sahayog badhane ke liye use karein.",
            ],
        },
        RemedyArea::Children => RemedySet {
            category_name: "Santan Prapti aur Family Growth",
            free: "Bhagwan Krishna ki pooja karein aur Shukrawar ko doodh ka bhog lagayein.",
            buyable: &[
                "Putra Prapti Yantra: Santan sukh ke liye ashirwad deta hai.",
                "Moti (Pearl) Stone: Mann ki shanti aur matritva shakti ko badhata hai.",
            ],
        },
        RemedyArea::Property => RemedySet {
            category_name: "Property aur Home Stability",
            free: "Har shaam ghar ke mukhya dwar par ek deepak jalayein.",
            buyable: &[
                "Vastu Yantra: Ghar ke North-East kone mein rakhein.",
                "Red Jasper Bracelet: Zameen se jude vivaad aur sthirta ke liye.",
            ],
        },
        RemedyArea::Litigation => RemedySet {
            category_name: "Litigation aur Court Case",
            free: "Mangalwar aur Shanivar ko Hanuman Chalisa ka path karein.",
            buyable: &[
                "Ganesha Yantra: Rukavatein hatane aur vivaad mein safalta ke liye.",
                "Tiger Eye Bracelet: Himmat aur focus deta hai court case ke dauran.",
            ],
        },
        RemedyArea::Finance => RemedySet {
            category_name: "Finance, Money aur Prosperity",
            free: "Har roz, khaaskar Shukrawar ko, Kanakadhara Stotram ka path karein.",
            buyable: &[
                "Green Aventurine Bracelet: Dhan aur naye avsaron ko aakarshit karta hai.",
                "Shri Yantra: Cash box mein rakhein dhan ki lagatar flow ke liye.",
            ],
        },
        RemedyArea::General => RemedySet {
            category_name: "Health, Energy aur Peace",
            free: "Har din Om Namah Shivaya mantra ka 108 baar jaap karein.",
            buyable: &[
                "Amethyst Stone: Stress aur man ki shanti ke liye.",
                "Tulsi Mala: Swasthya, suraksha aur shuddhi ke liye pehnein.",
            ],
        },
    }
}

/// True only when the user expresses a problem or pain, so remedies are not
/// tacked onto neutral questions like "career ke bare mein bataiye".
pub fn should_append_remedies(user_text: &str) -> bool {
    if user_text.is_empty() {
        return false;
    }
    let lower = user_text.to_lowercase();
    PROBLEM_MARKERS.iter().any(|m| lower.contains(m))
}

/// Route an utterance to its problem area; General when nothing matches.
pub fn detect_area(user_text: &str) -> RemedyArea {
    let lower = user_text.to_lowercase();
    AREA_TABLE
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(area, _)| *area)
        .unwrap_or(RemedyArea::General)
}

/// Compact remedy block: one free item, one paid item, activation note.
pub fn format_compact(area: RemedyArea) -> String {
    let set = remedy_set(area);
    let paid = set.buyable.first().copied().unwrap_or_default();
    format!(
        "\n\nUpay ({}):\n1. {}\n2. {}\nActivation: {}",
        set.category_name, set.free, paid, ACTIVATION
    )
}

/// Full remedy block with every buyable option.
pub fn format_full(area: RemedyArea) -> String {
    let set = remedy_set(area);
    let paid = set
        .buyable
        .iter()
        .map(|item| format!("  - {item}"))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "\n---\n{} ke liye upay:\n- Free: {}\n- Paid options:\n{}\n- Activation: {}",
        set.category_name, set.free, paid, ACTIVATION
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn problem_gate() {
        assert!(should_append_remedies("job nahi mil rahi, bahut pareshani hai"));
        assert!(should_append_remedies("marriage delay ho rahi hai"));
        assert!(should_append_remedies("I am worried about my case"));
        assert!(!should_append_remedies("career ke bare mein bataiye"));
        assert!(!should_append_remedies(""));
    }

    #[test]
    fn area_routing() {
        assert_eq!(detect_area("naukri ki dikkat hai"), RemedyArea::Career);
        assert_eq!(detect_area("partner se jhagda"), RemedyArea::Love);
        assert_eq!(detect_area("shaadi mein deri"), RemedyArea::Marriage);
        assert_eq!(detect_area("santan nahi ho rahi"), RemedyArea::Children);
        assert_eq!(detect_area("zameen ka vivaad"), RemedyArea::Property);
        assert_eq!(detect_area("court case chal raha hai"), RemedyArea::Litigation);
        assert_eq!(detect_area("paisa ruk gaya hai"), RemedyArea::Finance);
        assert_eq!(detect_area("neend nahi aati"), RemedyArea::General);
    }

    #[test]
    fn compact_block_has_one_free_one_paid() {
        let block = format_compact(RemedyArea::Career);
        assert!(block.contains("Career aur Business"));
        assert!(block.contains("1. Har subah"));
        assert!(block.contains("2. Pyrite Bracelet"));
        assert!(block.contains("Activation:"));
        // Only the first buyable item appears in compact form.
        assert!(!block.contains("Tiger Eye"));
    }

    #[test]
    fn full_block_lists_all_buyables() {
        let block = format_full(RemedyArea::Finance);
        assert!(block.contains("Green Aventurine"));
        assert!(block.contains("Shri Yantra"));
        assert!(block.contains("- Free:"));
    }
}
