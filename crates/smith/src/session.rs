use serde::{Deserialize, Serialize};

use crate::assembler::{PromptAssembler, TaskRequest};
use crate::compiler::CompilerClient;
use crate::errors::{SmithError, SmithResult};
use crate::models::message::{Conversation, Message};
use crate::models::role::Role;
use crate::tasks::{TaskKind, TaskTemplate};

/// Working state for drafting one contract. Every operation only commits
/// its result after the remote call succeeded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContractSession {
    pub kind: TaskKind,
    pub title: String,
    pub pseudo_code: String,
    pub contract_code: String,
    pub config: String,
    pub manifest: String,
    pub nef: String,
    pub messages: Conversation,
}

impl ContractSession {
    pub fn new(kind: TaskKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    pub async fn draft_pseudo_code(
        &mut self,
        assembler: &PromptAssembler,
        title: &str,
    ) -> SmithResult<&str> {
        let request = TaskRequest::new(TaskTemplate::PseudoCode, [title]).with_kind(self.kind);
        let pseudo_code = assembler.build_and_run(&request).await?;

        self.title = title.to_string();
        self.pseudo_code = pseudo_code;
        Ok(&self.pseudo_code)
    }

    /// Draft the contract and start a fresh conversation around it
    pub async fn draft_contract(&mut self, assembler: &PromptAssembler) -> SmithResult<&str> {
        let request = TaskRequest::new(
            TaskTemplate::NewContract,
            [self.title.as_str(), self.pseudo_code.as_str()],
        )
        .with_kind(self.kind);
        let prompt = request.template.render(&request.subjects)?;
        let contract_code = assembler.build_and_run(&request).await?;

        self.messages = Conversation::from(vec![
            Message::user(prompt),
            Message::assistant(contract_code.clone()),
        ]);
        self.contract_code = contract_code;
        Ok(&self.contract_code)
    }

    /// Chat turn: revise the contract using the conversation so far
    pub async fn revise(
        &mut self,
        assembler: &PromptAssembler,
        user_request: &str,
    ) -> SmithResult<&str> {
        let mut conversation = self.revision_history();
        let request = TaskRequest::new(TaskTemplate::Revision, [user_request])
            .with_kind(self.kind)
            .with_history(conversation.messages().to_vec());
        let reply = assembler.build_and_run(&request).await?;

        conversation.push(Message::user(user_request));
        conversation.push(Message::assistant(reply.clone()));
        self.messages = conversation;
        self.contract_code = reply;
        Ok(&self.contract_code)
    }

    /// The conversation a revision builds on. A contract that never went
    /// through the chat is put in front of the model as the latest version.
    fn revision_history(&self) -> Conversation {
        let mut conversation = self.messages.clone();
        let has_reply = conversation
            .iter()
            .any(|message| message.role == Role::Assistant);
        if !has_reply && !self.contract_code.trim().is_empty() {
            conversation.push(Message::user("Here is the current version of the contract."));
            conversation.push(Message::assistant(self.contract_code.clone()));
        }
        conversation
    }

    pub async fn draft_config(&mut self, assembler: &PromptAssembler) -> SmithResult<&str> {
        let request = TaskRequest::new(TaskTemplate::ConfigFile, [self.contract_code.as_str()]);
        self.config = assembler.build_and_run(&request).await?;
        Ok(&self.config)
    }

    pub async fn compile(&mut self, compiler: &CompilerClient) -> SmithResult<()> {
        let artifact = compiler.compile(&self.contract_code, &self.config).await?;

        self.manifest = serde_json::to_string(&artifact.manifest)
            .map_err(|e| SmithError::InvalidResponse(e.to_string()))?;
        self.nef = artifact.nef;
        Ok(())
    }
}
