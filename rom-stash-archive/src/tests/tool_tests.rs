use super::*;
use std::path::PathBuf;

#[test]
fn render_substitutes_all_tokens() {
    let subst = Substitutions::for_rename(Path::new("in.7z"), "old/a.bin", "new/a.bin");
    let args = render_args(
        &[
            "rn".to_string(),
            "$(infile)".to_string(),
            "$(entry)".to_string(),
            "$(new_entry)".to_string(),
        ],
        &subst,
    );
    assert_eq!(args, vec!["rn", "in.7z", "old/a.bin", "new/a.bin"]);
}

#[test]
fn render_handles_embedded_tokens() {
    let subst = Substitutions::for_entry(Path::new("in.7z"), "a.bin");
    let args = render_args(&["-si$(entry)".to_string()], &subst);
    assert_eq!(args, vec!["-sia.bin"]);
}

#[test]
fn zip_modifier_escapes_glob_chars() {
    let subst = Substitutions::for_entry(Path::new("in.zip"), r"we[ird]\name.bin");
    let args = render_args(&["$(entry:zip)".to_string()], &subst);
    assert_eq!(args, vec![r"we\[ird\]\\name.bin"]);
}

#[test]
fn parse_list_skips_non_matching_rows() {
    let spec = sevenzip_spec();
    let list = spec.list.unwrap();
    let output = "\
2021-07-14 13:02:55 D....            0            0  subdir
2021-07-14 13:02:55 ....A         1024          500  subdir/a.bin
2021-07-14 13:02:56 ....A         2048         1000  b with spaces.bin
";
    let entries = parse_list_output(output, &list.parser, &list.validator).unwrap();
    assert_eq!(entries, vec!["subdir/a.bin", "b with spaces.bin"]);
}

#[test]
fn parse_list_handles_missing_packed_column() {
    let spec = sevenzip_spec();
    let list = spec.list.unwrap();
    let output = "2021-07-14 13:02:55 ....A         1024  solo.bin\n";
    let entries = parse_list_output(output, &list.parser, &list.validator).unwrap();
    assert_eq!(entries, vec!["solo.bin"]);
}

#[test]
fn zipinfo_parser_drops_directory_rows() {
    let spec = zip_tool_spec();
    let list = spec.list.unwrap();
    let output = "a.bin\nsub/\nsub/b.bin\n";
    let entries = parse_list_output(output, &list.parser, &list.validator).unwrap();
    assert_eq!(entries, vec!["a.bin", "sub/b.bin"]);
}

#[test]
fn provider_without_list_is_skipped() {
    let spec = ToolSpec {
        name: "broken".to_string(),
        read: Some(CmdSpec::new("cat", &["$(infile)"])),
        ..Default::default()
    };
    assert!(ToolProvider::new(spec).is_none());
}

#[test]
fn provider_without_write_degrades_to_read_only() {
    let provider = ToolProvider::new(zip_tool_spec()).unwrap();
    assert!(!provider.write_enabled());
    assert!(matches!(
        provider.write(
            &PathBuf::from("x.zip"),
            "e",
            &mut std::io::Cursor::new(Vec::new())
        ),
        Err(StashError::NotSupported(_))
    ));
}

#[test]
fn missing_tool_surfaces_as_io_error() {
    let spec = ToolSpec {
        name: "ghost".to_string(),
        extensions: vec!["ghost".to_string()],
        list: Some(ListSpec {
            cmd: CmdSpec::new("rom-stash-no-such-tool", &["l", "$(infile)"]),
            parser: Regex::new(r"^(?P<entry>.+)$").unwrap(),
            validator: Vec::new(),
        }),
        read: Some(CmdSpec::new("rom-stash-no-such-tool", &["e", "$(infile)"])),
        ..Default::default()
    };
    let provider = ToolProvider::new(spec).unwrap();
    assert!(matches!(
        provider.list(Path::new("x.ghost")),
        Err(StashError::Io(_))
    ));
}
