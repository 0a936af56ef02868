use projsim_scan::{
    DiscoveryConfig, DiscoveryError, DiscoveryMode, FileRules, ProjectFinder, WarningKind,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn submissions() -> TempDir {
    let temp = TempDir::new().unwrap();
    let parent = temp.path();

    // Maven project nested one level down.
    write(&parent.join("alice/project/pom.xml"), "<project/>");
    write(&parent.join("alice/project/src/App.java"), "class App {}");
    write(&parent.join("alice/project/target/app.class"), "cafebabe");
    write(&parent.join("alice/project/target/report.txt"), "build output");
    write(&parent.join("alice/notes.txt"), "outside the root");

    // Gradle project at the top level.
    write(&parent.join("bob/build.gradle"), "apply plugin: 'java'");
    write(&parent.join("bob/src/App.java"), "class App { }");

    // No marker anywhere.
    write(&parent.join("carol/src/App.java"), "class App {}");

    // Marker but nothing relevant besides ignored files.
    write(&parent.join("dave/build.gradle.kts"), "plugins {}");

    // A stray file at the parent level is not a candidate.
    write(&parent.join("README.md"), "submissions");

    temp
}

#[test]
fn test_discover_marker_projects() {
    let temp = submissions();
    let config = DiscoveryConfig::new(temp.path(), DiscoveryMode::Marker);

    let discovery = ProjectFinder::new().discover(&config).unwrap();

    let names: Vec<_> = discovery.projects.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["alice", "bob"]);
    assert_eq!(discovery.candidates, 4);

    let alice = discovery.project("alice").unwrap();
    assert!(alice.root.ends_with("alice/project"));
    let files: Vec<_> = alice.files.keys().map(String::as_str).collect();
    assert_eq!(files, vec!["pom.xml", "src/App.java"]);
}

#[test]
fn test_excluded_directory_never_catalogued() {
    let temp = submissions();
    let config = DiscoveryConfig::new(temp.path(), DiscoveryMode::Marker);

    let discovery = ProjectFinder::new().discover(&config).unwrap();

    for project in &discovery.projects {
        assert!(project.files.keys().all(|k| !k.starts_with("target/")));
        assert!(project.get("target/app.class").is_none());
    }
}

#[test]
fn test_project_without_relevant_files_is_skipped() {
    let temp = submissions();
    let config = DiscoveryConfig::builder()
        .parent(temp.path())
        .mode(DiscoveryMode::Marker)
        .rules(FileRules::default())
        .build()
        .unwrap();

    let discovery = ProjectFinder::new().discover(&config).unwrap();

    assert!(discovery.project("dave").is_none());
    assert!(
        discovery
            .warnings
            .iter()
            .any(|w| w.kind == WarningKind::EmptyProject && w.path.ends_with("dave"))
    );
}

#[test]
fn test_discover_markup_projects() {
    let temp = TempDir::new().unwrap();
    let parent = temp.path();
    write(&parent.join("ana/site/index.html"), "<h1>Hi</h1>");
    write(&parent.join("ana/site/css/style.css"), "h1 { color: red; }");
    write(&parent.join("ana/site/img/logo.png"), "png");
    write(&parent.join("ben/PAGE.HTM"), "<p>x</p>");
    write(&parent.join("cid/readme.txt"), "no markup");

    let config = DiscoveryConfig::new(parent, DiscoveryMode::Markup);
    let discovery = ProjectFinder::new().discover(&config).unwrap();

    let names: Vec<_> = discovery.projects.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["ana", "ben"]);

    let ana = discovery.project("ana").unwrap();
    let files: Vec<_> = ana.files.keys().map(String::as_str).collect();
    assert_eq!(files, vec!["css/style.css", "index.html"]);
    assert_eq!(discovery.project("ben").unwrap().file_count(), 1);
}

#[test]
fn test_descriptors_carry_metadata() {
    let temp = submissions();
    let config = DiscoveryConfig::new(temp.path(), DiscoveryMode::Marker);

    let discovery = ProjectFinder::new().discover(&config).unwrap();
    let bob = discovery.project("bob").unwrap();
    let app = bob.get("src/App.java").unwrap();

    assert_eq!(app.relative_path, "src/App.java");
    assert!(app.absolute_path.is_file());
    assert_eq!(app.size, "class App { }".len() as u64);
    assert!(app.timestamps.modified.is_some());
    assert_eq!(
        app.content_hash.unwrap().0,
        *blake3::hash(b"class App { }").as_bytes()
    );
}

#[test]
fn test_hashing_can_be_disabled() {
    let temp = submissions();
    let config = DiscoveryConfig::builder()
        .parent(temp.path())
        .compute_hashes(false)
        .build()
        .unwrap();

    let discovery = ProjectFinder::new().discover(&config).unwrap();

    assert!(
        discovery
            .projects
            .iter()
            .flat_map(|p| p.files.values())
            .all(|f| f.content_hash.is_none())
    );
}

#[test]
fn test_missing_parent_is_fatal() {
    let temp = TempDir::new().unwrap();
    let config = DiscoveryConfig::new(temp.path().join("nope"), DiscoveryMode::Marker);

    let err = ProjectFinder::new().discover(&config).unwrap_err();
    assert!(matches!(err, DiscoveryError::NotFound { .. }));
}

#[test]
fn test_file_parent_is_fatal() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("file.txt");
    fs::write(&file, "x").unwrap();

    let config = DiscoveryConfig::new(&file, DiscoveryMode::Marker);
    let err = ProjectFinder::new().discover(&config).unwrap_err();
    assert!(matches!(err, DiscoveryError::NotADirectory { .. }));
}

#[test]
fn test_empty_parent_yields_no_projects() {
    let temp = TempDir::new().unwrap();
    let config = DiscoveryConfig::new(temp.path(), DiscoveryMode::Marker);

    let discovery = ProjectFinder::new().discover(&config).unwrap();

    assert!(discovery.projects.is_empty());
    assert_eq!(discovery.candidates, 0);
    assert!(!discovery.has_warnings());
}
