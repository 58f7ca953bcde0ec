//! Edit loop controller
//!
//! The interactive edit-validate-recover state machine:
//! `EDIT -> VALIDATE -> {OK, PARSE_ERROR, SENSITIVE_DRIFT} -> MENU ->
//! {EDIT, CONTINUE, QUIT, UNDO}`. The session starts from a known-good
//! baseline, re-validates after every edit attempt, warns on sensitive
//! drift without ever blocking, and only checkpoints configurations the
//! daemon actually accepts.

use crate::error::{EditError, EditResult};
use crate::fingerprint::fingerprint;
use crate::pager;
use crate::settings::Settings;
use crate::store::VersionStore;
use crate::target::ConfigTarget;
use crate::validator::{NormalizedDump, Validation, Validator};
use colored::Colorize;
use std::io::{BufRead, Write};
use std::path::Path;
use tempfile::TempDir;
use tokio::process::Command;
use tracing::{debug, warn};

/// A recognized menu choice. Input is case-insensitive and accepts the
/// single letter or the full word; anything else is `Default`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Edit,
    Diff,
    Print,
    Continue,
    Quit,
    Undo,
    Default,
}

impl MenuChoice {
    pub fn parse(input: &str) -> Self {
        match input.trim().to_lowercase().as_str() {
            "e" | "edit" => Self::Edit,
            "d" | "diff" => Self::Diff,
            "p" | "print" => Self::Print,
            "c" | "continue" => Self::Continue,
            "q" | "quit" => Self::Quit,
            "u" | "undo" => Self::Undo,
            _ => Self::Default,
        }
    }
}

/// How the session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Exited via `continue` with a parsing config; a checkpoint was
    /// committed. `drift` reports whether sensitive settings changed.
    Committed { drift: bool },
    /// Exited via `quit`, or via `continue` with a broken file: on-disk
    /// edits are preserved but nothing was checkpointed.
    LeftDirty,
    /// Exited via `undo`; edits were discarded (or there was nothing to
    /// revert to).
    Reverted,
}

/// One interactive edit session over a resolved target.
///
/// Menu input comes from any `BufRead` so the loop is drivable from
/// tests; in production it reads stdin. The scratch directory holds the
/// temp files behind `diff` display and is removed on drop.
pub struct EditSession<'a, R> {
    settings: &'a Settings,
    target: &'a ConfigTarget,
    validator: Validator,
    store: VersionStore,
    input: R,
    scratch: TempDir,
    before: NormalizedDump,
    before_fp: Option<String>,
    current: NormalizedDump,
    drift: bool,
}

impl<'a, R: BufRead> EditSession<'a, R> {
    /// Initialize the version store and capture the pre-edit baseline.
    ///
    /// A baseline that does not parse aborts the whole session: the tool
    /// refuses to "fix forward" an already-broken configuration.
    pub async fn start(
        settings: &'a Settings,
        target: &'a ConfigTarget,
        input: R,
    ) -> EditResult<Self> {
        let validator = Validator::new(settings.service_bin.as_str());
        let store = VersionStore::new(target.store_root());
        store.ensure_initialized().await?;

        let before = match validator.validate(&target.validation_source()).await? {
            Validation::Parsed(dump) => dump,
            Validation::Failed(failure) => {
                return Err(EditError::BrokenBaseline(
                    failure.diagnostics.trim().to_string(),
                ));
            }
        };
        let before_fp = fingerprint(&before);
        debug!(
            "baseline captured for {}, sensitive fingerprint: {}",
            target.file.display(),
            if before_fp.is_some() { "present" } else { "absent" }
        );

        let scratch = tempfile::Builder::new().prefix("burrowedit-").tempdir()?;
        let current = before.clone();
        Ok(Self {
            settings,
            target,
            validator,
            store,
            input,
            scratch,
            before,
            before_fp,
            current,
            drift: false,
        })
    }

    /// Scratch directory path, for the startup cleanup hook.
    pub fn scratch_path(&self) -> &Path {
        self.scratch.path()
    }

    /// Drive the loop to one of its terminal exits. The first iteration
    /// always edits; later iterations edit only when the menu asked to.
    pub async fn run(&mut self) -> EditResult<SessionOutcome> {
        let mut edit_next = true;
        let mut displayed = false;

        loop {
            if edit_next {
                self.invoke_editor().await?;
                edit_next = false;
            }

            let parse_ok = match self
                .validator
                .validate(&self.target.validation_source())
                .await?
            {
                Validation::Parsed(dump) => {
                    self.current = dump;
                    // comparison only happens when both fingerprints
                    // exist; a baseline without sensitive lines never
                    // computes one (documented asymmetry)
                    self.drift = match (&self.before_fp, fingerprint(&self.current)) {
                        (Some(before), Some(after)) => *before != after,
                        _ => false,
                    };
                    true
                }
                Validation::Failed(failure) => {
                    println!(
                        "{} {}",
                        "✗".red().bold(),
                        "configuration does not parse".red()
                    );
                    println!("{}", failure.diagnostics.trim());
                    false
                }
            };

            // a transient diff/print display does not re-arm the
            // edit-by-default behavior for an unchanged error state
            let auto_edit = !parse_ok && !displayed;
            displayed = false;

            if self.drift {
                println!(
                    "{} {}",
                    "⚠".yellow().bold(),
                    "sensitive settings (identity name, secret, or port-22 passthrough) \
                     differ from session start"
                        .yellow()
                );
            }

            match self.prompt_menu()? {
                MenuChoice::Edit => edit_next = true,
                MenuChoice::Diff => {
                    pager::show_diff(self.settings, self.scratch.path(), &self.before, &self.current)
                        .await?;
                    displayed = true;
                }
                MenuChoice::Print => {
                    pager::page(self.settings, self.current.as_str()).await?;
                    displayed = true;
                }
                MenuChoice::Continue => {
                    if parse_ok {
                        self.store.checkpoint(&self.target.file).await?;
                        println!("{} {}", "✓".green().bold(), "changes checkpointed".green());
                        return Ok(SessionOutcome::Committed { drift: self.drift });
                    }
                    println!(
                        "{} {}",
                        "⚠".yellow().bold(),
                        "file left modified on disk but NOT checkpointed (it does not parse)"
                            .yellow()
                    );
                    return Ok(SessionOutcome::LeftDirty);
                }
                MenuChoice::Quit => {
                    println!("edits kept on disk; no checkpoint, no restart");
                    return Ok(SessionOutcome::LeftDirty);
                }
                MenuChoice::Undo => {
                    if self.store.revert(&self.target.file).await? {
                        println!("{} {}", "✓".green().bold(), "reverted to last checkpoint".green());
                    } else {
                        println!("nothing to revert: no checkpoint exists yet");
                    }
                    return Ok(SessionOutcome::Reverted);
                }
                MenuChoice::Default => {
                    // after a parse failure the default re-enters the
                    // editor; otherwise re-validate and redisplay
                    if auto_edit {
                        edit_next = true;
                    }
                }
            }
        }
    }

    async fn invoke_editor(&self) -> EditResult<()> {
        let (program, args) = self
            .settings
            .editor
            .split_first()
            .ok_or_else(|| EditError::settings("empty editor command"))?;
        debug!("invoking editor {program} on {}", self.target.file.display());

        let status = Command::new(program)
            .args(args)
            .arg(&self.target.file)
            .status()
            .await
            .map_err(|e| EditError::tool(program, format!("failed to start editor: {e}")))?;
        if !status.success() {
            warn!("editor exited with {status}");
        }
        Ok(())
    }

    /// Show the menu and read one choice. End of input falls through to
    /// the terminal-success exit, like `continue`.
    fn prompt_menu(&mut self) -> EditResult<MenuChoice> {
        println!();
        println!(
            "{}",
            "[e]dit  [d]iff  [p]rint  [c]ontinue  [q]uit  [u]ndo".bold()
        );
        print!("burrowedit> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(MenuChoice::Continue);
        }
        Ok(MenuChoice::parse(&line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;

    struct Fixture {
        dir: TempDir,
        settings: Settings,
        target: ConfigTarget,
    }

    impl Fixture {
        /// Private-mode target with a stub daemon (rejects files
        /// containing SYNTAXERR) and a scripted stand-in editor.
        fn new(initial: &str, editor_body: &str) -> Self {
            let dir = TempDir::new().unwrap();
            let conf = dir.path().join("burrow.conf");
            std::fs::write(&conf, initial).unwrap();

            let daemon = dir.path().join("burrowd-stub");
            std::fs::write(
                &daemon,
                "#!/bin/sh\n\
                 if grep -q SYNTAXERR \"$2\"; then\n\
                   echo \"parse error near SYNTAXERR\" >&2\n\
                   exit 1\n\
                 fi\n\
                 cat \"$2\"\n",
            )
            .unwrap();
            let mut perms = std::fs::metadata(&daemon).unwrap().permissions();
            perms.set_mode(0o755);
            std::fs::set_permissions(&daemon, perms).unwrap();

            let editor = dir.path().join("editor.sh");
            std::fs::write(&editor, editor_body).unwrap();

            let settings = Settings {
                editor: vec!["sh".into(), editor.to_string_lossy().into_owned()],
                pager: vec!["cat".into()],
                differ: vec!["diff".into(), "-u".into()],
                restart_delay_secs: 0,
                service_bin: daemon.to_string_lossy().into_owned(),
                shared_dir: PathBuf::from("/etc/burrow"),
            };
            let target = ConfigTarget::resolve(&conf, &settings).unwrap();
            Self {
                dir,
                settings,
                target,
            }
        }

        async fn run(&self, input: &str) -> EditResult<SessionOutcome> {
            let mut session =
                EditSession::start(&self.settings, &self.target, Cursor::new(input.to_string()))
                    .await?;
            session.run().await
        }

        async fn has_checkpoint(&self) -> bool {
            VersionStore::new(self.target.store_root())
                .has_history()
                .await
                .unwrap()
        }
    }

    #[test]
    fn menu_choices_accept_letters_and_words_case_insensitively() {
        for (input, expected) in [
            ("e", MenuChoice::Edit),
            ("EDIT", MenuChoice::Edit),
            ("d", MenuChoice::Diff),
            ("Diff", MenuChoice::Diff),
            ("p", MenuChoice::Print),
            ("print", MenuChoice::Print),
            ("C", MenuChoice::Continue),
            ("continue", MenuChoice::Continue),
            ("q", MenuChoice::Quit),
            ("Quit", MenuChoice::Quit),
            ("u", MenuChoice::Undo),
            ("undo", MenuChoice::Undo),
            ("", MenuChoice::Default),
            ("x", MenuChoice::Default),
            ("   ", MenuChoice::Default),
        ] {
            assert_eq!(MenuChoice::parse(input), expected, "input {input:?}");
        }
    }

    #[tokio::test]
    async fn broken_baseline_refuses_to_start() {
        let fx = Fixture::new("SYNTAXERR\n", ":\n");
        let err = fx.run("c\n").await.unwrap_err();
        assert!(matches!(err, EditError::BrokenBaseline(_)));
    }

    #[tokio::test]
    async fn untouched_config_continue_creates_one_checkpoint_without_drift() {
        // scenario: clean parse, no edit, continue
        let fx = Fixture::new("name alpha\nsecret hunter2\n", ":\n");
        let outcome = fx.run("c\n").await.unwrap();
        assert_eq!(outcome, SessionOutcome::Committed { drift: false });
        assert!(fx.has_checkpoint().await);
    }

    #[tokio::test]
    async fn default_after_parse_error_reenters_editor() {
        // first edit breaks the file, plain Enter re-edits, second edit
        // fixes it; the editor must have run exactly twice
        let dir_marker = "count";
        let fx = Fixture::new("name alpha\n", "");
        let editor = format!(
            "#!/bin/sh\n\
             n=0\n\
             [ -f \"{d}/{m}\" ] && n=$(cat \"{d}/{m}\")\n\
             n=$((n+1))\n\
             echo $n > \"{d}/{m}\"\n\
             cp \"{d}/step$n.conf\" \"$1\"\n",
            d = fx.dir.path().display(),
            m = dir_marker,
        );
        std::fs::write(fx.dir.path().join("editor.sh"), editor).unwrap();
        std::fs::write(fx.dir.path().join("step1.conf"), "SYNTAXERR\n").unwrap();
        std::fs::write(fx.dir.path().join("step2.conf"), "name beta\n").unwrap();

        let outcome = fx.run("\nc\n").await.unwrap();
        assert_eq!(outcome, SessionOutcome::Committed { drift: true });
        let count = std::fs::read_to_string(fx.dir.path().join(dir_marker)).unwrap();
        assert_eq!(count.trim(), "2");
    }

    #[tokio::test]
    async fn sensitive_edit_warns_but_continue_still_succeeds() {
        // scenario: secret changes, drift is reported, exit not blocked
        let fx = Fixture::new("name alpha\nsecret hunter2\n", "");
        let editor = "#!/bin/sh\nprintf 'name alpha\\nsecret other\\n' > \"$1\"\n";
        std::fs::write(fx.dir.path().join("editor.sh"), editor).unwrap();

        let outcome = fx.run("c\n").await.unwrap();
        assert_eq!(outcome, SessionOutcome::Committed { drift: true });
        assert!(fx.has_checkpoint().await);
    }

    #[tokio::test]
    async fn nonsensitive_edit_does_not_drift() {
        let fx = Fixture::new("name alpha\nsecret hunter2\nmtu 1420\n", "");
        let editor = "#!/bin/sh\nprintf 'name alpha\\nsecret hunter2\\nmtu 1280\\n' > \"$1\"\n";
        std::fs::write(fx.dir.path().join("editor.sh"), editor).unwrap();

        let outcome = fx.run("c\n").await.unwrap();
        assert_eq!(outcome, SessionOutcome::Committed { drift: false });
    }

    #[tokio::test]
    async fn continue_on_broken_file_leaves_it_dirty_without_checkpoint() {
        let fx = Fixture::new("name alpha\n", "#!/bin/sh\necho SYNTAXERR > \"$1\"\n");
        let outcome = fx.run("c\n").await.unwrap();
        assert_eq!(outcome, SessionOutcome::LeftDirty);
        assert!(!fx.has_checkpoint().await);
        let content = std::fs::read_to_string(&fx.target.file).unwrap();
        assert!(content.contains("SYNTAXERR"));
    }

    #[tokio::test]
    async fn quit_preserves_edits_without_checkpoint() {
        let fx = Fixture::new("name alpha\n", "#!/bin/sh\necho 'name beta' > \"$1\"\n");
        let outcome = fx.run("q\n").await.unwrap();
        assert_eq!(outcome, SessionOutcome::LeftDirty);
        assert!(!fx.has_checkpoint().await);
        assert_eq!(
            std::fs::read_to_string(&fx.target.file).unwrap(),
            "name beta\n"
        );
    }

    #[tokio::test]
    async fn undo_without_history_is_a_safe_noop() {
        let fx = Fixture::new("name alpha\n", ":\n");
        let outcome = fx.run("u\n").await.unwrap();
        assert_eq!(outcome, SessionOutcome::Reverted);
        assert_eq!(
            std::fs::read_to_string(&fx.target.file).unwrap(),
            "name alpha\n"
        );
    }

    #[tokio::test]
    async fn undo_restores_the_previous_checkpoint() {
        let fx = Fixture::new("name alpha\n", ":\n");
        // first session: checkpoint the pristine content
        assert_eq!(
            fx.run("c\n").await.unwrap(),
            SessionOutcome::Committed { drift: false }
        );

        // second session: edit, then discard
        std::fs::write(
            fx.dir.path().join("editor.sh"),
            "#!/bin/sh\necho 'name beta' > \"$1\"\n",
        )
        .unwrap();
        let outcome = fx.run("u\n").await.unwrap();
        assert_eq!(outcome, SessionOutcome::Reverted);
        assert_eq!(
            std::fs::read_to_string(&fx.target.file).unwrap(),
            "name alpha\n"
        );
    }

    #[tokio::test]
    async fn end_of_input_falls_through_to_checkpoint() {
        let fx = Fixture::new("name alpha\n", ":\n");
        let outcome = fx.run("").await.unwrap();
        assert_eq!(outcome, SessionOutcome::Committed { drift: false });
        assert!(fx.has_checkpoint().await);
    }

    #[tokio::test]
    async fn diff_and_print_loop_back_without_exiting() {
        let fx = Fixture::new("name alpha\n", "#!/bin/sh\necho 'name beta' > \"$1\"\n");
        let outcome = fx.run("d\np\nc\n").await.unwrap();
        assert_eq!(outcome, SessionOutcome::Committed { drift: true });
    }
}
