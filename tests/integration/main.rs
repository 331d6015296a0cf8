//! Integration tests for prerender

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    const TEMPLATE: &str = "<!doctype html><html><head><title>App</title></head><body><div id=\"root\"><server-markup></server-markup></div></body></html>";

    fn prerender(dir: &Path) -> Command {
        let mut cmd = cargo_bin_cmd!("prerender");
        cmd.current_dir(dir)
            .env("PRERENDER_CONFIG", dir.join("global.toml"));
        cmd
    }

    /// Project with a fixtures handler, one static and one parametrized route
    fn project(fixtures: &str) -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("web/dist")).unwrap();
        fs::write(root.join("web/dist/index.html"), TEMPLATE).unwrap();
        fs::write(root.join("fixtures.json"), fixtures).unwrap();
        fs::write(
            root.join("prerender.toml"),
            "[api]\nhandler = \"fixtures\"\nfixtures = \"fixtures.json\"\n",
        )
        .unwrap();
        fs::write(
            root.join("prerender.routes.json"),
            r#"{"routes": [
                {"name": "home", "path": "/", "page": {"type": "element", "tag": "h1",
                  "children": [{"type": "text", "value": "Home"}]}},
                {"name": "post", "path": "/posts/{id:Int}", "paths": ["/posts/1"], "page": {
                  "type": "query",
                  "query": "query GetPost($id: Int) { post(id: $id) { title } }",
                  "variables": {"id": "{{ params.id }}"},
                  "loading": [{"type": "text", "value": "Loading"}],
                  "children": [
                    {"type": "title", "value": "{{ data.post.title }}"},
                    {"type": "meta", "attrs": {"name": "description", "content": "Post {{ params.id }}"}},
                    {"type": "element", "tag": "article", "children": [
                      {"type": "text", "value": "{{ data.post.title }}"}
                    ]}
                  ]
                }}
            ]}"#,
        )
        .unwrap();
        temp
    }

    #[test]
    fn help_displays() {
        let temp = TempDir::new().unwrap();
        prerender(temp.path())
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("static HTML"));
    }

    #[test]
    fn version_displays() {
        let temp = TempDir::new().unwrap();
        prerender(temp.path())
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("prerender"));
    }

    #[test]
    fn config_path() {
        let temp = TempDir::new().unwrap();
        prerender(temp.path())
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("global.toml"));
    }

    #[test]
    fn config_show_merges_local_file() {
        let temp = project("{}");
        prerender(temp.path())
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[render]"))
            .stdout(predicate::str::contains("handler = \"fixtures\""));
    }

    #[test]
    fn config_show_without_local() {
        let temp = project("{}");
        prerender(temp.path())
            .args(["--no-local", "config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("handler = \"none\""));
    }

    #[test]
    fn init_creates_local_config() {
        let temp = TempDir::new().unwrap();
        prerender(temp.path()).arg("init").assert().success();
        assert!(temp.path().join("prerender.toml").exists());

        prerender(temp.path())
            .arg("init")
            .assert()
            .failure()
            .stderr(predicate::str::contains("already exists"));
    }

    #[test]
    fn routes_lists_paths() {
        let temp = project("{}");
        prerender(temp.path())
            .args(["routes", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("/posts/1"));
    }

    #[test]
    fn completions_generate() {
        let temp = TempDir::new().unwrap();
        prerender(temp.path())
            .args(["completions", "bash"])
            .assert()
            .success()
            .stdout(predicate::str::contains("prerender"));
    }

    #[test]
    fn render_writes_documents() {
        let temp = project(r#"{"GetPost": {"data": {"post": {"title": "First post"}}}}"#);
        prerender(temp.path())
            .args(["render", "--report", "report.json"])
            .assert()
            .success();

        let dist = temp.path().join("web/dist");
        let post = fs::read_to_string(dist.join("posts/1.html")).unwrap();
        assert!(post.contains("<title>First post</title>"));
        assert_eq!(post.matches("<title>").count(), 1);
        assert!(post.contains(r#"<meta content="Post 1" name="description">"#));
        assert!(post.contains("<article>First post</article>"));

        let home = fs::read_to_string(dist.join("index.html")).unwrap();
        assert!(home.contains("<h1>Home</h1>"));
        assert_eq!(fs::read_to_string(dist.join("200.html")).unwrap(), TEMPLATE);

        let report = fs::read_to_string(temp.path().join("report.json")).unwrap();
        assert!(report.contains("generated_at"));
    }

    #[test]
    fn rerender_starts_from_snapshot() {
        let temp = project(r#"{"GetPost": {"data": {"post": {"title": "First post"}}}}"#);
        for _ in 0..2 {
            prerender(temp.path()).arg("render").assert().success();
        }
        let home = fs::read_to_string(temp.path().join("web/dist/index.html")).unwrap();
        assert_eq!(home.matches("<h1>Home</h1>").count(), 1);
    }

    #[test]
    fn graphql_error_fails_path_without_output() {
        let temp = project(
            r#"{"GetPost": {"errors": [{"message": "Cannot query field \"title\" on type \"Post\"."}]}}"#,
        );
        prerender(temp.path())
            .args(["render"])
            .assert()
            .failure()
            .stdout(predicate::str::contains("Cannot query field"))
            .stderr(predicate::str::contains("1 of 2 paths"));

        assert!(!temp.path().join("web/dist/posts/1.html").exists());
    }

    #[test]
    fn missing_handler_renders_loading_state() {
        let temp = project("{}");
        fs::remove_file(temp.path().join("fixtures.json")).unwrap();

        prerender(temp.path()).arg("render").assert().success();

        let post = fs::read_to_string(temp.path().join("web/dist/posts/1.html")).unwrap();
        assert!(post.contains(">Loading</div>"));
        assert!(post.contains("<title>App</title>"));
    }

    #[test]
    fn missing_template_fails_with_hint() {
        let temp = project("{}");
        fs::remove_file(temp.path().join("web/dist/index.html")).unwrap();

        prerender(temp.path())
            .arg("render")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Hint:"));
    }
}
