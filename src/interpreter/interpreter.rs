use std::path::PathBuf;
use std::time::Instant;

use snafu::{OptionExt, ensure};
use tracing::debug;

use crate::ext::DurationExt;
use crate::filesystem::{FilesystemNode, NodeKind, Tree, display_name, normalize};
use crate::interpreter::Command;
use crate::interpreter::error::*;

pub const PROGRAM_NAME: &str = "vfs";

const ROOT: &str = "/";
const TAIL_LINES: usize = 10;
const EMPTY_DIRECTORY: &str = "directory is empty";
const EMPTY_FILE: &str = "file is empty";

/// Startup parameters reported by `conf-dump`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionInfo {
    pub vfs_path: Option<PathBuf>,
    pub script_path: Option<PathBuf>,
}

/// Result of running a single command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Continue(Vec<String>),
    Exit,
}

/// Command session over a [`Tree`], tracking the current directory and the
/// moment the session started.
pub struct Interpreter {
    tree: Tree,
    cwd: String,
    started_at: Instant,
    session: SessionInfo,
    vfs_loaded: bool,
}

impl Interpreter {
    pub fn new(tree: Tree, session: SessionInfo) -> Self {
        Self::with_start_time(tree, session, Instant::now())
    }

    pub fn with_start_time(tree: Tree, session: SessionInfo, started_at: Instant) -> Self {
        let vfs_loaded = tree.root().has_children();
        Self {
            tree,
            cwd: ROOT.to_string(),
            started_at,
            session,
            vfs_loaded,
        }
    }

    pub fn prompt(&self) -> String {
        format!("{PROGRAM_NAME}:{}$ ", self.cwd)
    }

    pub fn current_directory(&self) -> &str {
        &self.cwd
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn execute(&mut self, line: &str) -> Outcome {
        self.dispatch(Command::parse(line))
    }

    pub fn dispatch(&mut self, command: Command) -> Outcome {
        debug!("Dispatching {:?} in {}", command, self.cwd);
        let result = match &command {
            Command::Empty => Ok(Vec::new()),
            Command::Exit => return Outcome::Exit,
            Command::Ls { path } => self.ls(path.as_deref()),
            Command::Cd { path } => self.cd(path.as_deref()),
            Command::Tree { path } => self.tree_listing(path.as_deref()),
            Command::Mkdir { name } => self.mkdir(name.as_deref()),
            Command::Tail { path } => self.tail(path.as_deref()),
            Command::Uptime => Ok(vec![self.started_at.elapsed().to_hms()]),
            Command::ConfDump => Ok(self.conf_dump()),
            Command::Unknown { name } => UnknownCommandSnafu { name }.fail(),
        };

        match result {
            Ok(lines) => Outcome::Continue(lines),
            Err(e) => {
                debug!("Command '{}' failed: {:?}", command.name(), e);
                Outcome::Continue(vec![error_line(&command, &e)])
            }
        }
    }

    fn ls(&self, path: Option<&str>) -> Result<Vec<String>, CommandError> {
        let node = self.directory(path.unwrap_or(self.cwd.as_str()))?;
        let entries = node.list();
        if entries.is_empty() {
            return Ok(vec![EMPTY_DIRECTORY.to_string()]);
        }
        Ok(entries
            .into_iter()
            .map(|(name, kind)| display_name(name, kind))
            .collect())
    }

    fn cd(&mut self, path: Option<&str>) -> Result<Vec<String>, CommandError> {
        let shown = path.unwrap_or(ROOT);
        let target = self.target_path(shown);
        let node = self.tree.resolve(&target, ROOT).context(NotFoundSnafu { path: shown })?;
        ensure!(node.is_directory(), NotADirectorySnafu { path: shown });

        debug!("Changing directory from {} to {}", self.cwd, target);
        self.cwd = target;
        Ok(Vec::new())
    }

    fn tree_listing(&self, path: Option<&str>) -> Result<Vec<String>, CommandError> {
        let path = path.unwrap_or(self.cwd.as_str());
        let node = self.directory(path)?;
        let mut lines = vec![normalize(path, &self.cwd)];
        lines.extend(node.render());
        Ok(lines)
    }

    fn mkdir(&mut self, name: Option<&str>) -> Result<Vec<String>, CommandError> {
        let name = name.context(MissingArgumentSnafu {
            usage: "mkdir <name>",
        })?;
        let target = self.target_path(name);
        ensure!(
            self.tree.resolve(&target, ROOT).is_none(),
            AlreadyExistsSnafu { path: name }
        );

        if let Err(e) = self.tree.insert(&target, NodeKind::Directory, None) {
            debug!("Refusing to create {}: {}", target, e);
            return NotADirectorySnafu { path: name }.fail();
        }
        Ok(Vec::new())
    }

    fn tail(&self, path: Option<&str>) -> Result<Vec<String>, CommandError> {
        let path = path.context(MissingArgumentSnafu {
            usage: "tail <path>",
        })?;
        let node = self.tree.resolve(path, &self.cwd).context(NotFoundSnafu { path })?;
        ensure!(!node.is_directory(), IsADirectorySnafu { path });

        let Some(content) = node.content() else {
            return Ok(vec![EMPTY_FILE.to_string()]);
        };
        let lines: Vec<&str> = content.lines().collect();
        let start = lines.len().saturating_sub(TAIL_LINES);
        Ok(lines[start..].iter().map(|line| line.to_string()).collect())
    }

    fn conf_dump(&self) -> Vec<String> {
        vec![
            format!("vfs_path: {}", display_optional(&self.session.vfs_path)),
            format!("script_path: {}", display_optional(&self.session.script_path)),
            format!("current_directory: {}", self.cwd),
            format!("vfs_loaded: {}", if self.vfs_loaded { "yes" } else { "no" }),
        ]
    }

    fn directory(&self, path: &str) -> Result<&FilesystemNode, CommandError> {
        let node = self.tree.resolve(path, &self.cwd).context(NotFoundSnafu { path })?;
        ensure!(node.is_directory(), NotADirectorySnafu { path });
        Ok(node)
    }

    /// Absolute target of `cd` and `mkdir`. `..` is the parent of the
    /// current directory; any other argument is joined to it.
    fn target_path(&self, arg: &str) -> String {
        if arg == ".." {
            parent_of(&self.cwd)
        } else {
            normalize(arg, &self.cwd)
        }
    }
}

fn parent_of(path: &str) -> String {
    match path.rsplit_once('/') {
        Some((parent, _)) if !parent.is_empty() => parent.to_string(),
        _ => ROOT.to_string(),
    }
}

fn display_optional(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(none)".to_string())
}

fn error_line(command: &Command, error: &CommandError) -> String {
    match error {
        CommandError::UnknownCommand { .. } => format!("{PROGRAM_NAME}: {error}"),
        _ => format!("{}: {error}", command.name()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::VfsLoader;
    use rstest::*;
    use std::time::Duration;

    fn empty() -> Interpreter {
        Interpreter::new(Tree::new(), SessionInfo::default())
    }

    fn sample() -> Interpreter {
        let mut tree = Tree::new();
        tree.insert("/home/user/notes.txt", NodeKind::File, Some("one\ntwo".into())).unwrap();
        tree.insert("/etc/motd", NodeKind::File, Some("hello".into())).unwrap();
        tree.insert("/empty.txt", NodeKind::File, None).unwrap();
        tree.insert("/var", NodeKind::Directory, None).unwrap();
        Interpreter::new(tree, SessionInfo::default())
    }

    fn run(interpreter: &mut Interpreter, line: &str) -> Vec<String> {
        match interpreter.execute(line) {
            Outcome::Continue(lines) => lines,
            Outcome::Exit => panic!("unexpected exit for '{line}'"),
        }
    }

    #[test]
    fn empty_line_produces_no_output() {
        assert!(run(&mut empty(), "   ").is_empty());
    }

    #[test]
    fn exit_signals_termination() {
        assert_eq!(empty().execute("exit"), Outcome::Exit);
    }

    #[test]
    fn unknown_command_is_reported() {
        assert_eq!(
            run(&mut empty(), "frobnicate --now"),
            vec!["vfs: frobnicate: command not found"]
        );
    }

    #[test]
    fn ls_on_empty_tree_reports_empty_directory() {
        assert_eq!(run(&mut empty(), "ls /"), vec!["directory is empty"]);
    }

    #[test]
    fn ls_lists_sorted_with_directory_suffix() {
        let mut interpreter = sample();
        assert_eq!(
            run(&mut interpreter, "ls"),
            vec!["empty.txt", "etc/", "home/", "var/"]
        );
        assert_eq!(run(&mut interpreter, "ls /home"), vec!["user/"]);
    }

    #[test]
    fn ls_is_sorted_regardless_of_insertion_order() {
        let mut interpreter = empty();
        for name in ["c", "a", "b"] {
            run(&mut interpreter, &format!("mkdir /{name}"));
        }
        assert_eq!(run(&mut interpreter, "ls /"), vec!["a/", "b/", "c/"]);
    }

    #[rstest]
    #[case("ls /nope", "ls: /nope: no such file or directory")]
    #[case("ls /etc/motd", "ls: /etc/motd: not a directory")]
    #[case("tree /nope", "tree: /nope: no such file or directory")]
    #[case("tree /etc/motd", "tree: /etc/motd: not a directory")]
    #[case("cd /nope", "cd: /nope: no such file or directory")]
    #[case("cd /etc/motd", "cd: /etc/motd: not a directory")]
    #[case("mkdir /etc", "mkdir: /etc: already exists")]
    #[case("mkdir /etc/motd/x", "mkdir: /etc/motd/x: not a directory")]
    #[case("mkdir", "mkdir: missing operand, usage: mkdir <name>")]
    #[case("mkdir a b", "mkdir: missing operand, usage: mkdir <name>")]
    #[case("tail", "tail: missing operand, usage: tail <path>")]
    #[case("tail /nope", "tail: /nope: no such file or directory")]
    #[case("tail /etc", "tail: /etc: is a directory")]
    fn errors_are_reported_as_single_line(#[case] line: &str, #[case] expected: &str) {
        assert_eq!(run(&mut sample(), line), vec![expected]);
    }

    #[test]
    fn cd_to_missing_directory_keeps_cursor() {
        let mut interpreter = empty();
        let output = run(&mut interpreter, "cd /nope");

        assert_eq!(output, vec!["cd: /nope: no such file or directory"]);
        assert_eq!(interpreter.current_directory(), "/");
    }

    #[test]
    fn cd_to_file_keeps_cursor() {
        let mut interpreter = sample();
        run(&mut interpreter, "cd /home");
        let output = run(&mut interpreter, "cd /etc/motd");

        assert_eq!(output, vec!["cd: /etc/motd: not a directory"]);
        assert_eq!(interpreter.current_directory(), "/home");
    }

    #[rstest]
    #[case("cd /home/user", "/home/user")]
    #[case("cd home", "/home")]
    #[case("cd /home//user/", "/home/user")]
    #[case("cd", "/")]
    #[case("cd ..", "/")]
    fn cd_moves_cursor(#[case] line: &str, #[case] expected: &str) {
        let mut interpreter = sample();
        assert!(run(&mut interpreter, line).is_empty());
        assert_eq!(interpreter.current_directory(), expected);
        assert_eq!(interpreter.prompt(), format!("vfs:{expected}$ "));
    }

    #[test]
    fn cd_relative_from_subdirectory() {
        let mut interpreter = sample();
        run(&mut interpreter, "cd /home");
        run(&mut interpreter, "cd user");
        assert_eq!(interpreter.current_directory(), "/home/user");
    }

    #[rstest]
    #[case("/", "home")]
    #[case("/", "/etc")]
    #[case("/home", "user")]
    fn cd_then_parent_returns_to_previous(#[case] start: &str, #[case] target: &str) {
        let mut interpreter = sample();
        run(&mut interpreter, &format!("cd {start}"));
        run(&mut interpreter, &format!("cd {target}"));
        assert_ne!(interpreter.current_directory(), start);

        run(&mut interpreter, "cd ..");
        assert_eq!(interpreter.current_directory(), start);
    }

    #[test]
    fn cd_parent_at_root_stays_at_root() {
        let mut interpreter = empty();
        run(&mut interpreter, "cd ..");
        assert_eq!(interpreter.current_directory(), "/");
    }

    #[test]
    fn generic_resolution_treats_dot_segments_literally() {
        let mut interpreter = sample();
        run(&mut interpreter, "cd /home/user");
        assert_eq!(
            run(&mut interpreter, "ls .."),
            vec!["ls: ..: no such file or directory"]
        );
        assert_eq!(
            run(&mut interpreter, "cd ../user"),
            vec!["cd: ../user: no such file or directory"]
        );
    }

    #[test]
    fn mkdir_creates_directory_resolvable_from_root() {
        let mut interpreter = empty();
        assert!(run(&mut interpreter, "mkdir /a/b/c").is_empty());

        for path in ["/a", "/a/b", "/a/b/c"] {
            assert_eq!(
                interpreter.tree().resolve(path, "/").map(FilesystemNode::kind),
                Some(NodeKind::Directory)
            );
        }
    }

    #[test]
    fn mkdir_relative_to_cursor() {
        let mut interpreter = sample();
        run(&mut interpreter, "cd /home");
        run(&mut interpreter, "mkdir docs");
        assert_eq!(run(&mut interpreter, "ls"), vec!["docs/", "user/"]);
    }

    #[test]
    fn mkdir_twice_fails_and_leaves_tree_unchanged() {
        let mut interpreter = empty();
        run(&mut interpreter, "mkdir /a");
        let before = interpreter.tree().clone();

        assert_eq!(
            run(&mut interpreter, "mkdir /a"),
            vec!["mkdir: /a: already exists"]
        );
        assert_eq!(interpreter.tree(), &before);
    }

    #[test]
    fn mkdir_parent_target_already_exists() {
        let mut interpreter = sample();
        run(&mut interpreter, "cd /home/user");
        assert_eq!(
            run(&mut interpreter, "mkdir .."),
            vec!["mkdir: ..: already exists"]
        );
    }

    #[test]
    fn tree_renders_nested_directories() {
        let mut interpreter = empty();
        run(&mut interpreter, "mkdir /a");
        run(&mut interpreter, "mkdir /a/b");
        assert_eq!(run(&mut interpreter, "tree /"), vec!["/", "  a/", "    b/"]);
    }

    #[test]
    fn tree_defaults_to_current_directory() {
        let mut interpreter = sample();
        run(&mut interpreter, "cd /home");
        assert_eq!(
            run(&mut interpreter, "tree"),
            vec!["/home", "  user/", "    notes.txt"]
        );
        assert_eq!(
            run(&mut interpreter, "tree user/"),
            vec!["/home/user", "  notes.txt"]
        );
    }

    #[test]
    fn tail_prints_all_lines_of_short_file() {
        assert_eq!(
            run(&mut sample(), "tail /home/user/notes.txt"),
            vec!["one", "two"]
        );
    }

    #[test]
    fn tail_reports_empty_file() {
        assert_eq!(run(&mut sample(), "tail /empty.txt"), vec!["file is empty"]);
    }

    #[rstest]
    #[case(1)]
    #[case(10)]
    #[case(11)]
    #[case(25)]
    fn tail_keeps_last_ten_lines(#[case] count: usize) {
        let content = (1..=count)
            .map(|n| format!("line {n}"))
            .collect::<Vec<_>>()
            .join("\n");
        let mut tree = Tree::new();
        tree.insert("/log", NodeKind::File, Some(content)).unwrap();
        let mut interpreter = Interpreter::new(tree, SessionInfo::default());

        let expected: Vec<String> = (count.saturating_sub(10) + 1..=count)
            .map(|n| format!("line {n}"))
            .collect();
        assert_eq!(run(&mut interpreter, "tail /log"), expected);
    }

    #[test]
    fn tail_after_loading_base64_content() {
        let source = "path,type,content\n/etc/motd, file, aGVsbG8=\n";
        let tree = VfsLoader::parse(source.as_bytes()).unwrap();
        let mut interpreter = Interpreter::new(tree, SessionInfo::default());

        assert_eq!(run(&mut interpreter, "tail /etc/motd"), vec!["hello"]);
    }

    #[test]
    fn uptime_reports_elapsed_since_start() {
        let started_at = Instant::now()
            .checked_sub(Duration::from_secs(5))
            .expect("monotonic clock should be past five seconds");
        let mut interpreter =
            Interpreter::with_start_time(Tree::new(), SessionInfo::default(), started_at);

        assert_eq!(run(&mut interpreter, "uptime"), vec!["00:00:05"]);
    }

    #[test]
    fn conf_dump_without_sources() {
        let mut interpreter = empty();
        assert_eq!(
            run(&mut interpreter, "conf-dump"),
            vec![
                "vfs_path: (none)",
                "script_path: (none)",
                "current_directory: /",
                "vfs_loaded: no",
            ]
        );
    }

    #[test]
    fn conf_dump_reports_session() {
        let session = SessionInfo {
            vfs_path: Some(PathBuf::from("fs.csv")),
            script_path: Some(PathBuf::from("start.txt")),
        };
        let mut tree = Tree::new();
        tree.insert("/home", NodeKind::Directory, None).unwrap();
        let mut interpreter = Interpreter::new(tree, session);
        run(&mut interpreter, "cd home");

        assert_eq!(
            run(&mut interpreter, "conf-dump"),
            vec![
                "vfs_path: fs.csv",
                "script_path: start.txt",
                "current_directory: /home",
                "vfs_loaded: yes",
            ]
        );
    }

    #[test]
    fn vfs_loaded_reflects_state_at_load_time() {
        let mut interpreter = empty();
        run(&mut interpreter, "mkdir /later");
        assert_eq!(run(&mut interpreter, "conf-dump")[3], "vfs_loaded: no");
    }

    #[rstest]
    #[case("/", "/")]
    #[case("/a", "/")]
    #[case("/a/b", "/a")]
    fn parent_of_drops_last_segment(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(parent_of(path), expected);
    }
}
