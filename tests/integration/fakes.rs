use std::collections::{HashMap, HashSet, VecDeque};
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use reposhift::error::MigrationError;
use reposhift::prompt::Confirm;
use reposhift::provider::{DestinationProvider, DestinationRepository};
use reposhift::transport::{MirrorTransport, TransportOutput};

#[derive(Default)]
pub struct FakeDestination {
    repositories: Mutex<HashMap<String, DestinationRepository>>,
    pub created: Mutex<Vec<String>>,
}

impl FakeDestination {
    pub fn with_repository(self, name: &str, size: u64) -> Self {
        self.repositories.lock().unwrap().insert(
            name.to_string(),
            DestinationRepository {
                name: name.to_string(),
                ssh_url: format!("git@github.com:org/existing-{}.git", name),
                size,
            },
        );
        self
    }

    pub fn created(&self) -> Vec<String> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl DestinationProvider for FakeDestination {
    async fn find_repository(&self, name: &str) -> anyhow::Result<Option<DestinationRepository>> {
        Ok(self.repositories.lock().unwrap().get(name).cloned())
    }

    async fn create_repository(&self, name: &str) -> anyhow::Result<DestinationRepository> {
        let repository = DestinationRepository {
            name: name.to_string(),
            ssh_url: format!("git@github.com:org/{}.git", name),
            size: 0,
        };
        self.repositories
            .lock()
            .unwrap()
            .insert(name.to_string(), repository.clone());
        self.created.lock().unwrap().push(name.to_string());
        Ok(repository)
    }
}

/// Records every call as `"<operation> <repository> [<argument>]"` and
/// simulates the mirror on disk so scratch handling can be observed.
#[derive(Default)]
pub struct FakeTransport {
    pub calls: Mutex<Vec<String>>,
    pub fail_fetch: HashSet<String>,
    pub fail_push: HashSet<String>,
    pub scratch_existed_before_fetch: Mutex<Vec<String>>,
}

impl FakeTransport {
    pub fn failing_push(names: &[&str]) -> Self {
        FakeTransport {
            fail_push: names.iter().map(|name| name.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn failing_fetch(names: &[&str]) -> Self {
        FakeTransport {
            fail_fetch: names.iter().map(|name| name.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

fn repository_name(scratch: &Path) -> String {
    scratch
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn failure(operation: &str) -> MigrationError {
    MigrationError::Transport {
        operation: operation.to_string(),
        status: "exit status: 128".to_string(),
        output: "fatal: could not read from remote repository".to_string(),
    }
}

#[async_trait]
impl MirrorTransport for FakeTransport {
    async fn fetch_mirror(
        &self,
        _clone_url: &str,
        scratch: &Path,
    ) -> Result<TransportOutput, MigrationError> {
        let name = repository_name(scratch);
        if scratch.exists() {
            self.scratch_existed_before_fetch
                .lock()
                .unwrap()
                .push(name.clone());
        }
        self.record(format!("fetch {}", name));

        if self.fail_fetch.contains(&name) {
            return Err(failure("git clone --mirror"));
        }

        std::fs::create_dir_all(scratch.join("refs")).unwrap();
        std::fs::write(scratch.join("HEAD"), "ref: refs/heads/main\n").unwrap();
        Ok(TransportOutput {
            output: format!("Cloning into bare repository '{}'...", name),
        })
    }

    async fn rewrite_history_for_large_files(
        &self,
        scratch: &Path,
        pattern: &str,
    ) -> Result<TransportOutput, MigrationError> {
        self.record(format!("lfs {} {}", repository_name(scratch), pattern));
        Ok(TransportOutput::default())
    }

    async fn push_mirror(
        &self,
        scratch: &Path,
        push_url: &str,
    ) -> Result<TransportOutput, MigrationError> {
        let name = repository_name(scratch);
        assert!(scratch.join("HEAD").exists(), "push without a mirror");
        self.record(format!("push {} {}", name, push_url));

        if self.fail_push.contains(&name) {
            return Err(failure("git push --mirror"));
        }
        Ok(TransportOutput::default())
    }
}

/// Answers prompts from a fixed script; an unscripted prompt is an error.
#[derive(Default)]
pub struct ScriptedPrompt {
    answers: Mutex<VecDeque<bool>>,
    pub questions: Mutex<Vec<String>>,
}

impl ScriptedPrompt {
    pub fn answering(answers: &[bool]) -> Self {
        ScriptedPrompt {
            answers: Mutex::new(answers.iter().copied().collect()),
            questions: Mutex::new(Vec::new()),
        }
    }

    pub fn questions(&self) -> Vec<String> {
        self.questions.lock().unwrap().clone()
    }
}

#[async_trait]
impl Confirm for ScriptedPrompt {
    async fn confirm(&self, question: &str) -> anyhow::Result<bool> {
        self.questions.lock().unwrap().push(question.to_string());
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("unexpected prompt: {}", question))
    }
}
