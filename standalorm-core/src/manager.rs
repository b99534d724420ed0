//! Named connection profile management: add, switch, edit, remove, list.
//!
//! Every operation validates against the in-memory record first and only then
//! mutates and commits, so a refused operation leaves both the record and the
//! settings file untouched.

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::builders::{build_profile, DriverProbe};
use crate::editor::{parse_edited, render_for_edit, ProfileEditor};
use crate::error::{Action, OrmError, Result};
use crate::profile::{ConnectionProfile, DatabaseKind};
use crate::prompt::Prompter;
use crate::settings::{SettingsRecord, SettingsStore, DEFAULT_CONNECTION};

/// Control input that lists taken names during `add`
pub const LIST_NAMES_COMMAND: &str = "!names";

/// Settings loaded once at process entry, plus where they go back to
pub struct Context<S: SettingsStore> {
    store: S,
    record: SettingsRecord,
    user_root: PathBuf,
}

impl<S: SettingsStore> Context<S> {
    pub fn load(store: S, user_root: impl Into<PathBuf>) -> Result<Self> {
        let record = store.load()?;
        Ok(Self {
            store,
            record,
            user_root: user_root.into(),
        })
    }

    pub fn record(&self) -> &SettingsRecord {
        &self.record
    }

    pub fn record_mut(&mut self) -> &mut SettingsRecord {
        &mut self.record
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Project root that relative SQLite paths resolve against
    pub fn user_root(&self) -> &Path {
        &self.user_root
    }

    /// Persist the current record
    pub fn commit(&mut self) -> Result<()> {
        self.store.save(&self.record)
    }
}

/// Outcome of a successful `remove`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removed {
    pub name: String,
    /// The removed connection was active; `default` is active now
    pub was_active: bool,
}

pub struct ProfileManager<'a, S: SettingsStore> {
    ctx: &'a mut Context<S>,
    prompter: &'a mut dyn Prompter,
}

impl<'a, S: SettingsStore> ProfileManager<'a, S> {
    pub fn new(ctx: &'a mut Context<S>, prompter: &'a mut dyn Prompter) -> Self {
        Self { ctx, prompter }
    }

    /// Interactively create a profile and store it under a fresh name
    pub fn add(
        &mut self,
        kind: Option<DatabaseKind>,
        use_env: bool,
        drivers: &dyn DriverProbe,
    ) -> Result<String> {
        let kind = match kind {
            Some(kind) if use_env && !kind.supports_env() => {
                return Err(OrmError::EnvModeUnsupported { kind })
            }
            Some(kind) => kind,
            None => self.choose_kind(use_env)?,
        };

        let user_root = self.ctx.user_root().to_path_buf();
        let profile = build_profile(kind, use_env, &mut *self.prompter, drivers, &user_root)?;

        let name = self.choose_name()?;
        self.ctx.record_mut().databases.insert(name.clone(), profile);
        self.ctx.commit()?;

        info!(connection = %name, %kind, "added database connection");
        Ok(name)
    }

    fn choose_kind(&mut self, use_env: bool) -> Result<DatabaseKind> {
        let choices = DatabaseKind::choices(use_env);
        let labels: Vec<String> = choices.iter().map(|k| k.label().to_string()).collect();
        let picked = self.prompter.select("Choose a database:", &labels)?;
        picked.parse()
    }

    fn choose_name(&mut self) -> Result<String> {
        self.prompter.say(
            "Choose a name for this database connection. This name will be used to identify the\n\
             database to both standalorm and you, so make sure it's both unique and easily\n\
             recognizable. A random name will be generated if you leave this empty.\n\
             (Enter !names to see what names you can't use.)",
        );

        loop {
            let input = self.prompter.text("Connection name:")?;
            let name = input.trim().to_lowercase();

            if name == LIST_NAMES_COMMAND {
                self.prompter.say(
                    "The following names are being used by other database connections and can't be used for this one:",
                );
                for existing in self.ctx.record().names(true) {
                    self.prompter.say(&format!("* {}", existing));
                }
                continue;
            }

            if name.is_empty() {
                let generated = uuid::Uuid::new_v4().to_string();
                debug!(%generated, "generated connection name");
                return Ok(generated);
            }

            if name.starts_with('!') {
                self.prompter
                    .warn("Names starting with '!' are reserved for commands.");
                continue;
            }

            if self.ctx.record().contains(&name) {
                self.prompter.warn("The name must be unique.");
                continue;
            }

            return Ok(name);
        }
    }

    /// Make another connection the active one
    pub fn switch(&mut self, name: Option<&str>) -> Result<String> {
        let candidates = self.ctx.record().names(true);
        let target = self.resolve_target(
            Action::Switch,
            name,
            &candidates,
            "Which database connection would you like to switch to?",
            |c| c.len() > 1,
        )?;

        self.ctx.record_mut().config.db_name = target.clone();
        self.ctx.commit()?;

        info!(connection = %target, "switched database connection");
        Ok(target)
    }

    /// Round-trip a profile through the user's editor; `ENGINE` stays fixed
    pub fn edit(&mut self, name: Option<&str>, editor: &mut dyn ProfileEditor) -> Result<String> {
        let candidates = self.ctx.record().names(false);
        let target = self.resolve_target(
            Action::Edit,
            name,
            &candidates,
            "Which database connection would you like to edit?",
            |c| !c.is_empty(),
        )?;

        let current = &self.ctx.record().databases[&target];
        let engine = current.engine.clone();
        let text = render_for_edit(&current.fields)?;

        let edited = editor.edit(&text)?;
        let mut fields = parse_edited(&edited)?;
        fields.remove("ENGINE");

        self.ctx
            .record_mut()
            .databases
            .insert(target.clone(), ConnectionProfile { engine, fields });
        self.ctx.commit()?;

        info!(connection = %target, "edited database connection");
        Ok(target)
    }

    /// Delete a profile, falling back to `default` when it was active
    pub fn remove(&mut self, name: Option<&str>) -> Result<Removed> {
        let candidates = self.ctx.record().names(false);
        let target = self.resolve_target(
            Action::Remove,
            name,
            &candidates,
            "Which database connection would you like to remove?",
            |c| !c.is_empty(),
        )?;

        let record = self.ctx.record_mut();
        let was_active = record.is_active(&target);
        if was_active {
            record.config.db_name = DEFAULT_CONNECTION.to_string();
        }
        record.databases.remove(&target);
        self.ctx.commit()?;

        info!(connection = %target, was_active, "removed database connection");
        Ok(Removed {
            name: target,
            was_active,
        })
    }

    /// Pick the connection an operation applies to.
    ///
    /// Prompts only when no name was given and `can_prompt` holds for the
    /// candidates; returns the stored key.
    fn resolve_target(
        &mut self,
        action: Action,
        name: Option<&str>,
        candidates: &[String],
        question: &str,
        can_prompt: impl Fn(&[String]) -> bool,
    ) -> Result<String> {
        let requested = match name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => name.to_string(),
            None if can_prompt(candidates) => self.prompter.select(question, candidates)?,
            None => String::new(),
        };

        if !can_prompt(candidates) {
            return Err(OrmError::NoCandidates { action });
        }

        let folded = requested.to_lowercase();
        candidates
            .iter()
            .find(|candidate| candidate.to_lowercase() == folded)
            .cloned()
            .ok_or_else(|| OrmError::unknown_connection(requested))
    }
}

/// Names for `db ls`: the active one only, or all including `default`
pub fn list_connections(record: &SettingsRecord, current_only: bool) -> Vec<String> {
    if current_only {
        vec![record.active_name().to_string()]
    } else {
        record.names(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::ScriptedPrompter;
    use crate::settings::MemoryStore;

    fn context_with(names: &[&str]) -> Context<MemoryStore> {
        let mut record = SettingsRecord::default();
        for name in names {
            record.databases.insert(
                name.to_string(),
                ConnectionProfile::sqlite(format!("{}.sqlite3", name)),
            );
        }
        Context::load(MemoryStore::new(record), "/home/user/project").unwrap()
    }

    #[test]
    fn test_resolve_target_prompts_when_name_missing() {
        let mut ctx = context_with(&["prod", "staging"]);
        let mut prompter = ScriptedPrompter::new(["staging"]);
        let mut manager = ProfileManager::new(&mut ctx, &mut prompter);

        let switched = manager.switch(None).unwrap();
        assert_eq!(switched, "staging");
        assert_eq!(ctx.record().active_name(), "staging");
        assert_eq!(ctx.store().saves(), 1);
    }

    #[test]
    fn test_remove_default_by_name_is_unknown() {
        let mut ctx = context_with(&["prod"]);
        let mut prompter = ScriptedPrompter::default();
        let err = ProfileManager::new(&mut ctx, &mut prompter)
            .remove(Some("default"))
            .unwrap_err();

        assert!(matches!(err, OrmError::UnknownConnection { .. }));
        assert!(ctx.record().contains("default"));
        assert_eq!(ctx.store().saves(), 0);
    }

    #[test]
    fn test_edit_without_candidates() {
        let mut ctx = context_with(&[]);
        let mut prompter = ScriptedPrompter::default();
        struct Untouched;
        impl ProfileEditor for Untouched {
            fn edit(&mut self, contents: &str) -> Result<String> {
                Ok(contents.to_string())
            }
        }

        let err = ProfileManager::new(&mut ctx, &mut prompter)
            .edit(None, &mut Untouched)
            .unwrap_err();
        assert!(matches!(
            err,
            OrmError::NoCandidates {
                action: Action::Edit
            }
        ));
    }

    #[test]
    fn test_list_connections() {
        let ctx = context_with(&["prod"]);
        assert_eq!(
            list_connections(ctx.record(), false),
            vec!["default".to_string(), "prod".to_string()]
        );
        assert_eq!(list_connections(ctx.record(), true), vec!["default".to_string()]);
    }
}
