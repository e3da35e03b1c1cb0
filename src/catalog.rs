//! The program → year → branch → section taxonomy and the subjects taught to each
//! `program-year-branch` combination.

use serde::{Deserialize, Serialize};

/// The prefix that marks a section name as a student's original (home) section.
pub const ORIGINAL_PREFIX: &str = "(O)";

/// Builds the full name of a section, e.g. `B.Tech-I-CSE-A`.
pub fn section_name(program: &str, year: &str, branch: &str, section: &str) -> String {
    format!("{program}-{year}-{branch}-{section}")
}

/// Builds the name of the original section paired with a manipulated section.
pub fn original_section_name(section_name: &str) -> String {
    format!("{ORIGINAL_PREFIX}{section_name}")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub name: String,
    pub sections: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub name: String,
    pub years: Vec<String>,
    pub branches: Vec<Branch>,
}

/// The subjects taught to one `program-year-branch` combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectGroup {
    pub program: String,
    pub year: String,
    pub branch: String,
    pub subjects: Vec<String>,
}

impl SubjectGroup {
    fn matches(&self, program: &str, year: &str, branch: &str) -> bool {
        self.program == program && self.year == year && self.branch == branch
    }
}

/// A single section placement within the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionPlacement<'a> {
    pub program: &'a str,
    pub year: &'a str,
    pub branch: &'a str,
    pub section: &'a str,
}

impl SectionPlacement<'_> {
    pub fn name(&self) -> String {
        section_name(self.program, self.year, self.branch, self.section)
    }
}

/// The static academic structure the store is seeded from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub programs: Vec<Program>,
    pub subjects: Vec<SubjectGroup>,
}

impl Catalog {
    /// Returns the subjects configured for a combination, or an empty slice if there are none.
    pub fn subjects_for(&self, program: &str, year: &str, branch: &str) -> &[String] {
        self.subjects
            .iter()
            .find(|group| group.matches(program, year, branch))
            .map(|group| group.subjects.as_slice())
            .unwrap_or_default()
    }

    /// Returns the subjects taught to a manipulated section, given its full name.
    ///
    /// Names that do not split into exactly four `-`-separated parts have no subjects.
    pub fn subjects_for_section(&self, section_name: &str) -> &[String] {
        let parts: Vec<&str> = section_name.split('-').collect();

        match parts.as_slice() {
            [program, year, branch, _] => self.subjects_for(program, year, branch),
            _ => &[],
        }
    }

    /// Iterates over every section placement, in configuration order.
    pub fn sections(&self) -> impl Iterator<Item = SectionPlacement<'_>> {
        self.programs.iter().flat_map(|program| {
            program.years.iter().flat_map(move |year| {
                program.branches.iter().flat_map(move |branch| {
                    branch.sections.iter().map(move |section| SectionPlacement {
                        program: &program.name,
                        year,
                        branch: &branch.name,
                        section,
                    })
                })
            })
        })
    }

    /// Iterates over every `(program, year, branch)` combination, in configuration order.
    pub fn combinations(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.programs.iter().flat_map(|program| {
            program.years.iter().flat_map(move |year| {
                program
                    .branches
                    .iter()
                    .map(move |branch| (program.name.as_str(), year.as_str(), branch.name.as_str()))
            })
        })
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn branch(name: &str, sections: &[&str]) -> Branch {
    Branch {
        name: name.to_string(),
        sections: strings(sections),
    }
}

fn subject_group(program: &str, year: &str, branch: &str, subjects: &[&str]) -> SubjectGroup {
    SubjectGroup {
        program: program.to_string(),
        year: year.to_string(),
        branch: branch.to_string(),
        subjects: strings(subjects),
    }
}

impl Default for Catalog {
    fn default() -> Self {
        let programs = vec![
            Program {
                name: "B.Tech".to_string(),
                years: strings(&["I", "II", "III", "IV"]),
                branches: vec![
                    branch("CSE", &["A", "B", "C"]),
                    branch("ECE", &["A", "B"]),
                    branch("AI", &["A", "B"]),
                ],
            },
            Program {
                name: "MCA".to_string(),
                years: strings(&["I", "II"]),
                branches: vec![branch("MCA", &["A"])],
            },
            Program {
                name: "Diploma".to_string(),
                years: strings(&["I", "II", "III"]),
                branches: vec![branch("CSE", &["A", "B"]), branch("ECE", &["A"])],
            },
        ];

        let subjects = vec![
            subject_group("B.Tech", "I", "CSE", &["Python", "Mathematics-I", "Physics"]),
            subject_group("B.Tech", "II", "CSE", &["Data Structures", "DBMS", "Java"]),
            subject_group(
                "MCA",
                "I",
                "MCA",
                &["Programming Fundamentals", "Computer Organization"],
            ),
        ];

        Self { programs, subjects }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_sections() {
        assert_eq!(section_name("B.Tech", "I", "CSE", "A"), "B.Tech-I-CSE-A");
        assert_eq!(original_section_name("B.Tech-I-CSE-A"), "(O)B.Tech-I-CSE-A");
    }

    #[test]
    fn looks_up_subjects() {
        let catalog = Catalog::default();

        assert_eq!(
            catalog.subjects_for("B.Tech", "I", "CSE"),
            ["Python", "Mathematics-I", "Physics"]
        );
        assert!(catalog.subjects_for("B.Tech", "IV", "AI").is_empty());
        assert_eq!(
            catalog.subjects_for_section("B.Tech-II-CSE-B"),
            ["Data Structures", "DBMS", "Java"]
        );
        assert!(catalog.subjects_for_section("nonsense").is_empty());
    }

    #[test]
    fn enumerates_sections() {
        let catalog = Catalog::default();
        let names: Vec<String> = catalog.sections().map(|p| p.name()).collect();

        // B.Tech: 4 years * 7 sections, MCA: 2 * 1, Diploma: 3 * 3.
        assert_eq!(names.len(), 28 + 2 + 9);
        assert_eq!(names[0], "B.Tech-I-CSE-A");
        assert!(names.contains(&"MCA-II-MCA-A".to_string()));
        assert_eq!(catalog.combinations().count(), 12 + 2 + 6);
    }
}
