//! Read-only in-memory filesystem behind the shell-flavored terminal commands.
//!
//! Every operation is total: missing paths come back as `None` or `false`,
//! never as an error.

use std::collections::BTreeMap;

pub const ROOT_PATH: &str = "/";
pub const HOME_PATH: &str = "/home/guest";
pub const SECRETS_PATH: &str = "/secrets";

#[derive(Debug, Clone, PartialEq)]
pub enum VfsNode {
    Directory { children: BTreeMap<String, VfsNode> },
    File { content: String },
}

impl VfsNode {
    pub fn dir() -> Self {
        Self::Directory {
            children: BTreeMap::new(),
        }
    }

    pub fn file(content: impl Into<String>) -> Self {
        Self::File {
            content: content.into(),
        }
    }

    pub fn with_child(mut self, name: impl Into<String>, child: VfsNode) -> Self {
        if let Self::Directory { children } = &mut self {
            children.insert(name.into(), child);
        }
        self
    }

    fn child(&self, name: &str) -> Option<&VfsNode> {
        match self {
            Self::Directory { children } => children.get(name),
            Self::File { .. } => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Vfs {
    root: VfsNode,
}

impl Default for Vfs {
    fn default() -> Self {
        Self::mission_default()
    }
}

impl Vfs {
    pub fn new(root: VfsNode) -> Self {
        Self { root }
    }

    pub fn mission_default() -> Self {
        let home = VfsNode::dir().with_child(
            "guest",
            VfsNode::dir()
                .with_child(
                    "readme.txt",
                    VfsNode::file(
                        "Welcome to mission control.\nType 'help' to list commands, 'uxv start' to launch a vehicle.",
                    ),
                )
                .with_child(
                    "notes.txt",
                    VfsNode::file("Ground station reports nominal telemetry.\nSomebody keeps probing the relay."),
                ),
        );
        let missions = VfsNode::dir()
            .with_child(
                "log.txt",
                VfsNode::file("T+00:00 uplink established\nT+00:42 vehicle handed to operator"),
            )
            .with_child(
                "patrols.txt",
                VfsNode::file("circle figure8 random zigzag"),
            );
        let etc = VfsNode::dir()
            .with_child("motd", VfsNode::file("All systems nominal."))
            .with_child("hostname", VfsNode::file("mission"));
        let root = VfsNode::dir()
            .with_child("home", home)
            .with_child("missions", missions)
            .with_child("etc", etc)
            .with_child(
                "secrets",
                VfsNode::file("Launch authority codeword: BLUE HERON. Do not share."),
            );
        Self::new(root)
    }

    /// Canonicalizes `input` against `cwd`: `.` is dropped, `..` pops one segment
    /// (never above `/`), and the result is always absolute.
    pub fn resolve_path(&self, cwd: &str, input: &str) -> String {
        let input = input.trim();
        let (base, rest) = if input == "~" {
            (HOME_PATH, "")
        } else if let Some(rest) = input.strip_prefix("~/") {
            (HOME_PATH, rest)
        } else if input.starts_with('/') {
            (ROOT_PATH, input)
        } else {
            (cwd, input)
        };

        let mut segments: Vec<&str> = Vec::new();
        for segment in base.split('/').chain(rest.split('/')) {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                name => segments.push(name),
            }
        }

        if segments.is_empty() {
            ROOT_PATH.to_string()
        } else {
            format!("/{}", segments.join("/"))
        }
    }

    pub fn is_directory(&self, path: &str) -> bool {
        matches!(self.lookup(path), Some(VfsNode::Directory { .. }))
    }

    pub fn exists(&self, path: &str) -> bool {
        self.lookup(path).is_some()
    }

    /// Child names in lexical order; directories carry a trailing `/`.
    pub fn list_directory(&self, path: &str) -> Option<Vec<String>> {
        match self.lookup(path)? {
            VfsNode::Directory { children } => Some(
                children
                    .iter()
                    .map(|(name, node)| match node {
                        VfsNode::Directory { .. } => format!("{name}/"),
                        VfsNode::File { .. } => name.clone(),
                    })
                    .collect(),
            ),
            VfsNode::File { .. } => None,
        }
    }

    pub fn read_file(&self, path: &str) -> Option<&str> {
        match self.lookup(path)? {
            VfsNode::File { content } => Some(content.as_str()),
            VfsNode::Directory { .. } => None,
        }
    }

    fn lookup(&self, path: &str) -> Option<&VfsNode> {
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .try_fold(&self.root, |node, segment| node.child(segment))
    }
}

/// Paths under `/secrets` need admin clearance to read.
pub fn is_restricted(path: &str) -> bool {
    path == SECRETS_PATH || path.starts_with("/secrets/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_handles_parent_and_current_segments() {
        let vfs = Vfs::mission_default();
        assert_eq!(vfs.resolve_path("/a/b", "../c"), "/a/c");
        assert_eq!(vfs.resolve_path("/", "."), "/");
        assert_eq!(vfs.resolve_path("/", "../../.."), "/");
        assert_eq!(vfs.resolve_path("/home", "/etc/./motd"), "/etc/motd");
        assert_eq!(vfs.resolve_path("/etc", "~"), HOME_PATH);
        assert_eq!(vfs.resolve_path("/etc", "~/readme.txt"), "/home/guest/readme.txt");
    }

    #[test]
    fn missing_paths_are_none_not_errors() {
        let vfs = Vfs::mission_default();
        let path = vfs.resolve_path(HOME_PATH, "nonexistent");
        assert_eq!(vfs.read_file(&path), None);
        assert_eq!(vfs.list_directory(&path), None);
        assert!(!vfs.is_directory(&path));
    }

    #[test]
    fn listing_marks_directories_and_sorts_names() {
        let vfs = Vfs::mission_default();
        assert_eq!(
            vfs.list_directory("/").expect("root listing"),
            vec!["etc/", "home/", "missions/", "secrets"]
        );
        assert_eq!(vfs.list_directory("/secrets"), None);
    }

    #[test]
    fn read_file_returns_content_and_rejects_directories() {
        let vfs = Vfs::mission_default();
        assert_eq!(vfs.read_file("/etc/motd"), Some("All systems nominal."));
        assert_eq!(vfs.read_file("/etc"), None);
        assert!(vfs.is_directory("/home/guest"));
    }

    #[test]
    fn restricted_paths_cover_secrets_subtree_only() {
        assert!(is_restricted("/secrets"));
        assert!(is_restricted("/secrets/plan"));
        assert!(!is_restricted("/secretsauce"));
    }
}
