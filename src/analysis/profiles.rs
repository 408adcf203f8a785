//! Analysis profiles and their focus topics.

use std::fmt;

const DEFAULT_TOPICS: &[&str] = &[
    "Overall structure",
    "Architecture strengths and weaknesses",
    "Code quality and maintainability",
    "Recommendations with code examples",
];

const SECURITY_TOPICS: &[&str] = &[
    "Security vulnerabilities",
    "Authentication and authorization",
    "Data protection",
    "Input validation and sanitization",
];

const PERFORMANCE_TOPICS: &[&str] = &[
    "Computational efficiency",
    "Memory usage",
    "Bottlenecks",
    "Optimization opportunities",
];

const TESTING_TOPICS: &[&str] = &[
    "Test coverage",
    "Test quality",
    "Testing frameworks",
    "Mocking strategies",
];

const DOCUMENTATION_TOPICS: &[&str] = &[
    "Code documentation",
    "API documentation",
    "User guides",
    "Project setup instructions",
];

const SCALABILITY_TOPICS: &[&str] = &[
    "Horizontal scaling potential",
    "Vertical scaling limits",
    "Database scaling considerations",
    "Architectural scalability patterns",
];

/// A named set of focus topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AnalysisProfile {
    #[default]
    Default,
    Security,
    Performance,
    Testing,
    Documentation,
    Scalability,
    /// Default, then security, then performance topics.
    Comprehensive,
}

impl AnalysisProfile {
    pub const ALL: [AnalysisProfile; 7] = [
        AnalysisProfile::Default,
        AnalysisProfile::Security,
        AnalysisProfile::Performance,
        AnalysisProfile::Testing,
        AnalysisProfile::Documentation,
        AnalysisProfile::Scalability,
        AnalysisProfile::Comprehensive,
    ];

    /// Resolve a profile by name. Unknown or absent names map to `Default`.
    pub fn from_name(name: Option<&str>) -> Self {
        name.and_then(|name| Self::ALL.into_iter().find(|profile| profile.name() == name))
            .unwrap_or(AnalysisProfile::Default)
    }

    /// Resolve the short analysis-type code ("1".."7") used by the web API.
    pub fn from_code(code: Option<&str>) -> Self {
        match code.map(str::trim) {
            Some("2") => AnalysisProfile::Security,
            Some("3") => AnalysisProfile::Performance,
            Some("4") => AnalysisProfile::Testing,
            Some("5") => AnalysisProfile::Documentation,
            Some("6") => AnalysisProfile::Scalability,
            Some("7") => AnalysisProfile::Comprehensive,
            _ => AnalysisProfile::Default,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AnalysisProfile::Default => "default",
            AnalysisProfile::Security => "security",
            AnalysisProfile::Performance => "performance",
            AnalysisProfile::Testing => "testing",
            AnalysisProfile::Documentation => "documentation",
            AnalysisProfile::Scalability => "scalability",
            AnalysisProfile::Comprehensive => "comprehensive",
        }
    }

    /// Ordered topic list. Not deduplicated.
    pub fn topics(&self) -> Vec<&'static str> {
        match self {
            AnalysisProfile::Default => DEFAULT_TOPICS.to_vec(),
            AnalysisProfile::Security => SECURITY_TOPICS.to_vec(),
            AnalysisProfile::Performance => PERFORMANCE_TOPICS.to_vec(),
            AnalysisProfile::Testing => TESTING_TOPICS.to_vec(),
            AnalysisProfile::Documentation => DOCUMENTATION_TOPICS.to_vec(),
            AnalysisProfile::Scalability => SCALABILITY_TOPICS.to_vec(),
            AnalysisProfile::Comprehensive => DEFAULT_TOPICS
                .iter()
                .chain(SECURITY_TOPICS)
                .chain(PERFORMANCE_TOPICS)
                .copied()
                .collect(),
        }
    }
}

impl fmt::Display for AnalysisProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_round_trip() {
        for profile in AnalysisProfile::ALL {
            assert_eq!(AnalysisProfile::from_name(Some(profile.name())), profile);
        }
    }

    #[test]
    fn test_unknown_name_falls_back_to_default() {
        assert_eq!(AnalysisProfile::from_name(Some("fuzzing")), AnalysisProfile::Default);
        assert_eq!(AnalysisProfile::from_name(Some("Security")), AnalysisProfile::Default);
        assert_eq!(AnalysisProfile::from_name(None), AnalysisProfile::Default);
    }

    #[test]
    fn test_codes() {
        let expected = [
            ("1", AnalysisProfile::Default),
            ("2", AnalysisProfile::Security),
            ("3", AnalysisProfile::Performance),
            ("4", AnalysisProfile::Testing),
            ("5", AnalysisProfile::Documentation),
            ("6", AnalysisProfile::Scalability),
            ("7", AnalysisProfile::Comprehensive),
        ];
        for (code, profile) in expected {
            assert_eq!(AnalysisProfile::from_code(Some(code)), profile);
        }
        assert_eq!(AnalysisProfile::from_code(Some("8")), AnalysisProfile::Default);
        assert_eq!(AnalysisProfile::from_code(Some("")), AnalysisProfile::Default);
        assert_eq!(AnalysisProfile::from_code(None), AnalysisProfile::Default);
    }

    #[test]
    fn test_every_specialized_profile_has_four_topics() {
        for profile in AnalysisProfile::ALL {
            if profile != AnalysisProfile::Comprehensive {
                assert_eq!(profile.topics().len(), 4, "{}", profile);
            }
        }
    }

    #[test]
    fn test_comprehensive_concatenates_in_order() {
        let mut expected = AnalysisProfile::Default.topics();
        expected.extend(AnalysisProfile::Security.topics());
        expected.extend(AnalysisProfile::Performance.topics());
        assert_eq!(AnalysisProfile::Comprehensive.topics(), expected);
        assert_eq!(expected.len(), 12);
    }
}
