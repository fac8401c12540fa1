//! Runtime integration tests
//!
//! Loads module graphs from a temporary directory through the real
//! filesystem platform.

#![cfg(unix)]

use keel_engine::{Runtime, ScriptError, Value};
use keel_modules::{ErrorKind, Handle, LoaderConfig};
use std::fs;

struct Project {
    _dir: tempfile::TempDir,
    root: String,
}

impl Project {
    fn new(files: &[(&str, &str)]) -> Self {
        let dir = tempfile::tempdir().unwrap();
        for (name, source) in files {
            let path = dir.path().join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, source).unwrap();
        }
        let root = fs::canonicalize(dir.path())
            .unwrap()
            .to_string_lossy()
            .into_owned();
        Self { _dir: dir, root }
    }

    fn path(&self, name: &str) -> String {
        format!("{}/{}", self.root, name)
    }
}

fn paths(runtime: &Runtime, modules: &[Value]) -> Vec<String> {
    modules
        .iter()
        .map(|m| runtime.module_path(m).unwrap())
        .collect()
}

#[test]
fn test_graph_across_directories() {
    let project = Project::new(&[
        (
            "main.js",
            "import { helper } from './lib/util.js';\nimport { shared } from './shared.js';\nexport default helper(shared);\n",
        ),
        (
            "lib/util.js",
            "import { shared } from '../shared.js';\nexport function helper(x) { return x; }\n",
        ),
        ("shared.js", "export const shared = 42;\n"),
    ]);

    let mut runtime = Runtime::new(LoaderConfig::default());
    let graph = runtime.load_entry(&project.path("main.js")).unwrap();

    assert_eq!(
        paths(&runtime, &graph.modules),
        vec![
            project.path("main.js"),
            project.path("lib/util.js"),
            project.path("shared.js"),
        ]
    );
    assert!(graph.entry.same(&graph.modules[0]));
    assert_eq!(runtime.engine().parse_count(), 3);
    assert_eq!(runtime.cached_module_count(), 3);

    let main = graph.entry.as_module().unwrap();
    assert_eq!(main.syntax.exports, vec!["default"]);
}

#[test]
fn test_reload_hits_cache() {
    let project = Project::new(&[("main.js", "export const x = 1;\n")]);
    let mut runtime = Runtime::new(LoaderConfig::default());

    let first = runtime.load_entry(&project.path("main.js")).unwrap();
    let second = runtime.load_entry(&project.path("main.js")).unwrap();

    assert!(first.entry.same(&second.entry));
    assert_eq!(runtime.engine().parse_count(), 1);
}

#[test]
fn test_missing_import_is_syntax_error() {
    let project = Project::new(&[("main.js", "import './gone.js';\n")]);
    let mut runtime = Runtime::new(LoaderConfig::default());

    let err = runtime.load_entry(&project.path("main.js")).unwrap_err();
    assert_eq!(err, ScriptError::new(ErrorKind::Syntax, "Module file not found"));
    assert_eq!(err.to_string(), "SyntaxError: Module file not found");
}

#[test]
fn test_missing_import_strict() {
    let project = Project::new(&[("main.js", "import './gone.js';\n")]);
    let config = LoaderConfig {
        missing_module_as_syntax_error: false,
        ..LoaderConfig::default()
    };
    let mut runtime = Runtime::new(config);

    let err = runtime.load_entry(&project.path("main.js")).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Common);
    assert_eq!(
        err.message,
        format!("Cannot find module '{}'", project.path("./gone.js"))
    );
}

#[test]
fn test_directory_import_is_rejected() {
    let project = Project::new(&[("main.js", "import './lib';\n"), ("lib/a.js", "")]);
    let mut runtime = Runtime::new(LoaderConfig::default());

    let err = runtime.load_entry(&project.path("main.js")).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Syntax);
}

#[test]
fn test_parse_error_is_not_cached() {
    let project = Project::new(&[
        ("main.js", "import './bad.js';\n"),
        ("bad.js", "export const broken = {;\n"),
    ]);
    let mut runtime = Runtime::new(LoaderConfig::default());

    let err = runtime.load_entry(&project.path("main.js")).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Syntax);
    assert!(err.message.ends_with("[./bad.js:1]"), "{}", err.message);
    assert_eq!(runtime.cached_module_count(), 1);

    // Every retry goes back to the parser
    runtime.load_entry(&project.path("main.js")).unwrap_err();
    assert_eq!(runtime.engine().parse_count(), 3);
}

#[test]
fn test_realms_load_separate_graphs() {
    let project = Project::new(&[
        ("main.js", "import './dep.js';\n"),
        ("dep.js", "export const dep = 1;\n"),
    ]);
    let mut runtime = Runtime::new(LoaderConfig::default());

    let global = runtime.load_entry(&project.path("main.js")).unwrap();
    let realm = runtime.enter_new_realm().unwrap();
    let other = runtime.load_entry(&project.path("main.js")).unwrap();

    assert!(!global.entry.same(&other.entry));
    assert_eq!(runtime.cached_module_count(), 4);
    assert_eq!(runtime.engine().parse_count(), 4);

    assert_eq!(runtime.destroy_realm(&realm).unwrap(), 2);
    assert_eq!(runtime.cached_module_count(), 2);
    for module in &other.modules {
        assert!(module.as_module().unwrap().record().is_none());
    }
    for module in &global.modules {
        assert!(module.as_module().unwrap().record().is_some());
    }
}

#[test]
fn test_no_canonicalize_keeps_joined_paths() {
    let project = Project::new(&[
        ("main.js", "import './dep.js';\n"),
        ("dep.js", "export const dep = 1;\n"),
    ]);
    let config = LoaderConfig {
        canonicalize: false,
        ..LoaderConfig::default()
    };
    let mut runtime = Runtime::new(config);

    let graph = runtime.load_entry(&project.path("main.js")).unwrap();
    assert_eq!(
        paths(&runtime, &graph.modules),
        vec![project.path("main.js"), project.path("./dep.js")]
    );
}

#[test]
fn test_drop_releases_everything() {
    let project = Project::new(&[("main.js", "export const x = 1;\n")]);
    let mut runtime = Runtime::new(LoaderConfig::default());
    let graph = runtime.load_entry(&project.path("main.js")).unwrap();
    let entry = graph.entry.clone();
    drop(graph);

    assert_eq!(entry.ref_count(), 2);
    drop(runtime);
    assert_eq!(entry.ref_count(), 1);
}
