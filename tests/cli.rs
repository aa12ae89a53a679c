use std::fs;
use std::path::Path;
use std::process::Command;

use tempfile::tempdir;

fn write_file(path: &Path, contents: &[u8]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn srcmerge(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_srcmerge"))
        .args(args)
        .output()
        .unwrap()
}

#[test]
fn cli_merges_app_and_skips_node_modules() {
    let dir = tempdir().unwrap();

    write_file(&dir.path().join("app.js"), b"console.log(1);");
    write_file(&dir.path().join("node_modules/dep.js"), b"ignored");

    let output = srcmerge(&[dir.path().to_str().unwrap()]);
    assert!(output.status.success());

    let merged = dir.path().join("merge.md");
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 1);
    assert!(stdout.contains(merged.to_str().unwrap()));

    let document = fs::read_to_string(&merged).unwrap();
    assert_eq!(document, "app.js:\n```js\nconsole.log(1);\n```\n\n");
    assert!(!document.contains("ignored"));
}

#[test]
fn cli_only_matching_extension() {
    let dir = tempdir().unwrap();

    write_file(&dir.path().join("a.txt"), b"text");
    write_file(&dir.path().join("b.js"), b"let b = 2;");

    let output = srcmerge(&[dir.path().to_str().unwrap(), "--json"]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let v: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(v.get("files").and_then(|f| f.as_u64()), Some(1));

    let merged: Vec<&str> = v
        .get("merged")
        .and_then(|m| m.as_array())
        .unwrap()
        .iter()
        .map(|p| p.as_str().unwrap())
        .collect();
    assert_eq!(merged, vec!["b.js"]);
}

#[test]
fn cli_custom_extension_language_and_excludes() {
    let dir = tempdir().unwrap();

    write_file(&dir.path().join("src/lib.ts"), b"export const x = 1;");
    write_file(&dir.path().join("dist/lib.ts"), b"compiled");
    write_file(&dir.path().join("node_modules/pkg/index.ts"), b"vendored");

    let output = srcmerge(&[
        dir.path().to_str().unwrap(),
        "--extension",
        ".ts",
        "--lang",
        "ts",
        "--exclude",
        "dist",
        "--no-default-excludes",
        "--output",
        "review.md",
    ]);
    assert!(output.status.success());

    let document = fs::read_to_string(dir.path().join("review.md")).unwrap();
    assert!(document.contains("src/lib.ts:\n```ts\nexport const x = 1;\n```\n\n"));
    assert!(document.contains("node_modules/pkg/index.ts:"));
    assert!(!document.contains("compiled"));
}

#[test]
fn cli_twice_is_byte_identical() {
    let dir = tempdir().unwrap();

    write_file(&dir.path().join("z.js"), b"z");
    write_file(&dir.path().join("a/b.js"), b"b");

    assert!(srcmerge(&[dir.path().to_str().unwrap()]).status.success());
    let first = fs::read(dir.path().join("merge.md")).unwrap();
    assert!(srcmerge(&[dir.path().to_str().unwrap(), "--atomic"]).status.success());
    let second = fs::read(dir.path().join("merge.md")).unwrap();

    assert_eq!(first, second);
    let document = String::from_utf8(first).unwrap();
    assert!(document.find("a/b.js:").unwrap() < document.find("z.js:").unwrap());
}

#[test]
fn cli_relative_root_with_absolute_output() {
    let dir = tempdir().unwrap();
    let base = dir.path().canonicalize().unwrap();
    let proj = base.join("proj");

    write_file(&proj.join("app.js"), b"x");
    fs::create_dir_all(base.join("out")).unwrap();
    let merged = base.join("out/merge.md");

    let output = Command::new(env!("CARGO_BIN_EXE_srcmerge"))
        .current_dir(&proj)
        .args([".", "-o", merged.to_str().unwrap()])
        .output()
        .unwrap();
    assert!(output.status.success());

    let document = fs::read_to_string(&merged).unwrap();
    assert_eq!(document, "../proj/app.js:\n```js\nx\n```\n\n");
}

#[test]
fn cli_relative_root_with_parent_output() {
    let dir = tempdir().unwrap();
    let base = dir.path().canonicalize().unwrap();
    let proj = base.join("proj");

    write_file(&proj.join("lib/util.js"), b"y");
    fs::create_dir_all(base.join("elsewhere")).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_srcmerge"))
        .current_dir(&proj)
        .args(["-o", "../elsewhere/out.md"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let document = fs::read_to_string(base.join("elsewhere/out.md")).unwrap();
    assert_eq!(document, "../proj/lib/util.js:\n```js\ny\n```\n\n");
}

#[cfg(unix)]
#[test]
fn cli_merges_symlinked_file() {
    let dir = tempdir().unwrap();
    let other = tempdir().unwrap();

    write_file(&other.path().join("shared.js"), b"export {};");
    std::os::unix::fs::symlink(other.path().join("shared.js"), dir.path().join("shared.js"))
        .unwrap();

    let output = srcmerge(&[dir.path().to_str().unwrap()]);
    assert!(output.status.success());

    let document = fs::read_to_string(dir.path().join("merge.md")).unwrap();
    assert_eq!(document, "shared.js:\n```js\nexport {};\n```\n\n");
}

#[test]
fn cli_missing_root_fails() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope");

    let output = srcmerge(&[missing.to_str().unwrap()]);

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(3));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("error:"));
}

#[test]
fn cli_invalid_utf8_fails() {
    let dir = tempdir().unwrap();

    write_file(&dir.path().join("bad.js"), &[0x66, 0x6f, 0xff]);

    let output = srcmerge(&[dir.path().to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(5));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("bad.js"));
}

#[test]
fn cli_strict_fences_rejects_collision() {
    let dir = tempdir().unwrap();

    write_file(&dir.path().join("doc.js"), b"/*\n```\n*/");

    let output = srcmerge(&[dir.path().to_str().unwrap(), "--strict-fences"]);
    assert_eq!(output.status.code(), Some(6));
    assert!(!dir.path().join("merge.md").exists());

    let output = srcmerge(&[dir.path().to_str().unwrap()]);
    assert!(output.status.success());
}

#[test]
fn cli_json_error_output_is_valid_json_even_with_quotes_in_path() {
    let dir = tempdir().unwrap();

    let bad_path = dir.path().join("does-not-exist-\"quoted\"");

    let output = srcmerge(&[bad_path.to_str().unwrap(), "--json"]);

    assert!(!output.status.success());

    let stderr = String::from_utf8(output.stderr).unwrap();
    let _: serde_json::Value = serde_json::from_str(stderr.trim()).unwrap();
}

#[test]
fn cli_completions() {
    let output = srcmerge(&["completions", "bash"]);
    assert!(output.status.success());
    assert!(String::from_utf8(output.stdout).unwrap().contains("srcmerge"));
}
