//! The fixed instruction tables: one system instruction per [`TaskKind`]
//! and one user message template per [`TaskTemplate`].

use indoc::indoc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::errors::{SmithError, SmithResult};
use crate::prompt_template::load_prompt;
use crate::providers::base::SamplingParams;

/// Which specialist persona the model is asked to play
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    Display,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TaskKind {
    #[default]
    General,
    Defi,
    Nft,
    Dao,
    Gaming,
}

impl TaskKind {
    pub fn system_instruction(&self) -> &'static str {
        match self {
            TaskKind::General => "You are an expert smart contract developer familiar with Sway and the Fuel blockchain. You assist in creating, analyzing, and optimizing smart contracts based on user requirements.",
            TaskKind::Defi => "You are a DeFi specialist and smart contract developer expert in Sway and the Fuel blockchain. You focus on creating secure and efficient decentralized finance protocols.",
            TaskKind::Nft => "You are an NFT and digital asset specialist proficient in Sway and the Fuel blockchain. You excel in creating smart contracts for minting, trading, and managing non-fungible tokens.",
            TaskKind::Dao => "You are a DAO (Decentralized Autonomous Organization) expert and smart contract developer specializing in Sway and the Fuel blockchain. You create governance and voting systems for decentralized organizations.",
            TaskKind::Gaming => "You are a blockchain gaming specialist with expertise in Sway and the Fuel blockchain. You develop smart contracts for in-game assets, rewards, and game logic.",
        }
    }
}

/// Appended to a task that continues an earlier conversation
pub const HISTORY_NOTE: &str = "Take the earlier messages in this conversation into account. Where this request conflicts with them, follow this request.";

const CONFIG_FILE_INSTRUCTION: &str = indoc! {"
    Create a configuration file for a Fuel Sway smart contract. The config should be in YAML format and include the following elements:

    - name: String name of the contract
    - sourceurl: URL of the contract source code
    - supportedstandards: List of standards supported (e.g., FIP-1 for fungible tokens)
    - events: List of events emitted by the contract
    - safemethods: List of safe methods that can be called without spending gas
    - permissions: List of permission rules for different addresses

    Ensure the following:
    - Only return the configuration text, without comments or explanations
    - Format the YAML correctly according to the contract"};

/// A task the assembler knows how to phrase
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    Display,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TaskTemplate {
    PseudoCode,
    NewContract,
    Revision,
    SecurityAnalysis,
    GasOptimization,
    Documentation,
    TestCases,
    Explanation,
    UpgradePlan,
    Comparison,
    OptimizationStrategies,
    Interfaces,
    ErrorHandling,
    EventsAndLogging,
    AccessControl,
    DeploymentScripts,
    Scalability,
    MigrationPlan,
    Interoperability,
    ConfigFile,
}

impl TaskTemplate {
    /// Names of the subjects this template binds, in positional order
    pub fn slots(&self) -> &'static [&'static str] {
        match self {
            TaskTemplate::PseudoCode => &["title"],
            TaskTemplate::NewContract => &["purpose", "pseudo_code"],
            TaskTemplate::Revision => &["request"],
            TaskTemplate::UpgradePlan => &["contract", "requirements"],
            TaskTemplate::Comparison => &["first", "second"],
            TaskTemplate::MigrationPlan => &["contract", "platform"],
            _ => &["contract"],
        }
    }

    pub fn template(&self) -> &'static str {
        match self {
            TaskTemplate::PseudoCode => "Write pseudo code for a smart contract titled: {{ title }}",
            TaskTemplate::NewContract => "Create a smart contract for {{ purpose }} based on this pseudo code: {{ pseudo_code }}",
            TaskTemplate::Revision => indoc! {"
                Here is my next request about the contract in this conversation:

                {{ request }}

                Apply it to the most recent version of the contract above. Keep the earlier requirements unless this request changes them, and reply with the complete updated contract."},
            TaskTemplate::SecurityAnalysis => "Analyze the security of the following smart contract and provide recommendations:\n\n{{ contract }}",
            TaskTemplate::GasOptimization => "Optimize the gas usage of the following smart contract:\n\n{{ contract }}",
            TaskTemplate::Documentation => "Generate comprehensive documentation for the following smart contract:\n\n{{ contract }}",
            TaskTemplate::TestCases => "Suggest comprehensive test cases for the following smart contract:\n\n{{ contract }}",
            TaskTemplate::Explanation => "Explain the functionality of the following smart contract in simple terms:\n\n{{ contract }}",
            TaskTemplate::UpgradePlan => "Generate an upgrade plan for the following smart contract to meet these new requirements:\n\nCurrent Contract:\n{{ contract }}\n\nNew Requirements:\n{{ requirements }}",
            TaskTemplate::Comparison => "Compare the following two smart contracts and highlight the differences:\n\nContract 1:\n{{ first }}\n\nContract 2:\n{{ second }}",
            TaskTemplate::OptimizationStrategies => "Suggest optimization strategies for the following smart contract:\n\n{{ contract }}",
            TaskTemplate::Interfaces => "Generate interfaces for the following smart contract:\n\n{{ contract }}",
            TaskTemplate::ErrorHandling => "Suggest improvements for error handling in the following smart contract:\n\n{{ contract }}",
            TaskTemplate::EventsAndLogging => "Suggest appropriate events and logging for the following smart contract:\n\n{{ contract }}",
            TaskTemplate::AccessControl => "Suggest improvements for access control in the following smart contract:\n\n{{ contract }}",
            TaskTemplate::DeploymentScripts => "Generate deployment scripts for the following smart contract:\n\n{{ contract }}",
            TaskTemplate::Scalability => "Suggest scalability improvements for the following smart contract:\n\n{{ contract }}",
            TaskTemplate::MigrationPlan => "Generate a migration plan to move the following smart contract to {{ platform }}:\n\n{{ contract }}",
            TaskTemplate::Interoperability => "Suggest improvements for interoperability in the following smart contract:\n\n{{ contract }}",
            TaskTemplate::ConfigFile => "Generate a configuration for the following Fuel Sway smart contract code:\n{{ contract }}",
        }
    }

    /// Templates that replace the persona instruction with their own
    pub fn system_override(&self) -> Option<&'static str> {
        match self {
            TaskTemplate::ConfigFile => Some(CONFIG_FILE_INSTRUCTION),
            _ => None,
        }
    }

    pub fn sampling(&self) -> SamplingParams {
        match self {
            TaskTemplate::ConfigFile => SamplingParams {
                temperature: Some(1.0),
                top_p: Some(1.0),
                max_tokens: Some(512),
            },
            _ => SamplingParams::default(),
        }
    }

    /// Render the user message, binding `subjects` to `slots()` by position
    pub fn render(&self, subjects: &[String]) -> SmithResult<String> {
        let slots = self.slots();
        if subjects.len() != slots.len() {
            return Err(SmithError::SubjectCount {
                template: self.to_string(),
                expected: slots.len(),
                actual: subjects.len(),
            });
        }

        let context: HashMap<&str, &str> = slots
            .iter()
            .copied()
            .zip(subjects.iter().map(String::as_str))
            .collect();

        Ok(load_prompt(self.template(), &context)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_every_template_renders_all_slots() {
        for template in TaskTemplate::iter() {
            let subjects: Vec<String> = template
                .slots()
                .iter()
                .map(|slot| format!("<{}-value>", slot))
                .collect();

            let rendered = template.render(&subjects).unwrap();
            for subject in &subjects {
                assert!(
                    rendered.contains(subject.as_str()),
                    "{} did not embed {}",
                    template,
                    subject
                );
            }
            assert!(!rendered.contains("{{"), "{} left a placeholder", template);
        }
    }

    #[test]
    fn test_render_rejects_wrong_subject_count() {
        let err = TaskTemplate::Comparison
            .render(&["only one".to_string()])
            .unwrap_err();
        assert_eq!(
            err,
            SmithError::SubjectCount {
                template: "comparison".to_string(),
                expected: 2,
                actual: 1,
            }
        );
    }

    #[test]
    fn test_pseudo_code_wording() {
        let rendered = TaskTemplate::PseudoCode
            .render(&["ERC20-like token".to_string()])
            .unwrap();
        assert_eq!(
            rendered,
            "Write pseudo code for a smart contract titled: ERC20-like token"
        );
    }

    #[test]
    fn test_names_round_trip_through_strum() {
        assert_eq!(TaskTemplate::EventsAndLogging.to_string(), "events_and_logging");
        assert_eq!(
            TaskTemplate::from_str("upgrade_plan").unwrap(),
            TaskTemplate::UpgradePlan
        );
        assert_eq!(TaskKind::from_str("defi").unwrap(), TaskKind::Defi);
        assert_eq!(TaskTemplate::iter().count(), 20);
    }

    #[test]
    fn test_config_file_overrides() {
        let template = TaskTemplate::ConfigFile;
        assert!(template.system_override().unwrap().contains("YAML format"));
        assert_eq!(template.sampling().max_tokens, Some(512));
        assert!(TaskTemplate::Documentation.system_override().is_none());
    }

    #[test]
    fn test_instructions_are_distinct() {
        let instructions: std::collections::HashSet<&str> =
            TaskKind::iter().map(|k| k.system_instruction()).collect();
        assert_eq!(instructions.len(), 5);
        assert_eq!(TaskKind::default(), TaskKind::General);
    }
}
