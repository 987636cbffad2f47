//! Fixed content of the informational pages.

pub const UNIVERSITY: &str = "Coding University";

pub const HOME_HEADLINE: &str = "Welcome to Coding University";
pub const HOME_TAGLINE: &str = "Your journey to coding mastery starts here!";
pub const HOME_CHAT_BUTTON: &str = "Chat with our Assistant";

pub struct RequirementSection {
    pub title: &'static str,
    pub items: &'static [&'static str],
}

pub const REQUIREMENTS_HEADING: &str = "Admission Requirements";

pub const REQUIREMENTS_INTRO: &str = "To be considered for admission to Coding University, applicants must meet the following general requirements. Specific program requirements may vary.";

pub const REQUIREMENT_SECTIONS: &[RequirementSection] = &[
    RequirementSection {
        title: "Academic Prerequisites",
        items: &[
            "High school diploma or equivalent (for undergraduate programs)",
            "Bachelor's degree from an accredited institution (for graduate programs)",
            "Strong academic record, especially in mathematics and science courses",
        ],
    },
    RequirementSection {
        title: "Standardized Tests",
        items: &[
            "SAT/ACT scores (for undergraduate applicants, optional for some programs)",
            "GRE scores (for graduate applicants, optional for some programs)",
            "TOEFL/IELTS scores (for international applicants whose native language is not English)",
        ],
    },
    RequirementSection {
        title: "Supporting Documents",
        items: &[
            "Official transcripts from all previously attended institutions",
            "Personal statement or essay",
            "Letters of recommendation (typically 2-3)",
            "Resume/CV (especially for graduate applicants)",
        ],
    },
];

pub const REQUIREMENTS_OUTRO: &str = "For detailed, program-specific requirements, please refer to our program pages or contact the admissions office.";

/// Annual cost of one program level, in whole dollars.
pub struct TuitionRow {
    pub program: &'static str,
    pub tuition: u32,
    pub fees: u32,
}

impl TuitionRow {
    pub fn total(&self) -> u32 {
        self.tuition + self.fees
    }
}

pub struct AidOption {
    pub title: &'static str,
    pub description: &'static str,
}

pub const TUITION_HEADING: &str = "Tuition & Financial Aid";

pub const TUITION_INTRO: &str = "Coding University is committed to making quality education accessible. We offer various options to help students finance their education. Below is an overview of our tuition fees and available financial aid.";

pub const TUITION_TABLE_TITLE: &str = "Annual Tuition Fees (Estimated)";

pub const TUITION_COLUMNS: [&str; 4] = ["Program Level", "Tuition", "Fees", "Total (Approx.)"];

pub const TUITION_ROWS: &[TuitionRow] = &[
    TuitionRow { program: "Undergraduate", tuition: 25_000, fees: 2_500 },
    TuitionRow { program: "Graduate (Masters)", tuition: 30_000, fees: 3_000 },
    TuitionRow { program: "Graduate (Ph.D.)", tuition: 28_000, fees: 2_800 },
];

pub const TUITION_NOTE: &str = "*Note: These are estimated annual costs and may vary. Please consult the official university catalog for exact figures.";

pub const AID_TITLE: &str = "Financial Aid Options";

pub const AID_OPTIONS: &[AidOption] = &[
    AidOption {
        title: "Scholarships",
        description: "Merit-based, need-based, and external scholarships available. Apply early!",
    },
    AidOption {
        title: "Grants",
        description: "Non-repayable funds awarded based on financial need.",
    },
    AidOption {
        title: "Student Loans",
        description: "Federal and private loan options to cover educational expenses.",
    },
    AidOption {
        title: "Work-Study Programs",
        description: "Opportunities for part-time employment on campus to earn money for school.",
    },
];

pub const AID_OUTRO: &str = "Our financial aid office is ready to assist you. Visit our financial aid portal or contact us for personalized guidance.";

pub const AID_PORTAL_BUTTON: &str = "Visit Financial Aid Portal";

/// Format whole dollars as `$27,500`.
pub fn format_usd(amount: u32) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    out.push('$');
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
