mod util;

use util::{code, sort_lines, stdout, WorkDir};

// A basic stdin search prints the matching line and exits 0.
#[test]
fn stdin_basic() {
    let dir = WorkDir::new("stdin_basic");
    let out = dir.pipe(dir.command().arg("foo"), b"foo\nbar\n");
    assert_eq!(stdout(&out), "foo\n");
    assert_eq!(code(&out), 0);
}

// No selected lines exits 1.
#[test]
fn stdin_no_match_exit_code() {
    let dir = WorkDir::new("stdin_no_match");
    let out = dir.pipe(dir.command().arg("x"), b"a\nb\nc\n");
    assert_eq!(stdout(&out), "");
    assert_eq!(code(&out), 1);
}

// A zero count is still printed, and the exit code says no lines were
// selected.
#[test]
fn count_zero() {
    let dir = WorkDir::new("count_zero");
    let out = dir.pipe(dir.command().arg("-c").arg("x"), b"a\nb\nc\n");
    assert_eq!(stdout(&out), "0\n");
    assert_eq!(code(&out), 1);
}

#[test]
fn count_lines() {
    let dir = WorkDir::new("count_lines");
    dir.create("f", b"foo\nbar\nfoo foo\n");
    let out = dir.output(dir.command().arg("-c").arg("foo").arg("f"));
    assert_eq!(stdout(&out), "2\n");
    assert_eq!(code(&out), 0);
}

// -c with -g counts every match occurrence instead of matched lines.
#[test]
fn count_matches_no_group() {
    let dir = WorkDir::new("count_matches");
    dir.create("f", b"foo\nbar\nfoo foo\n");
    let out =
        dir.output(dir.command().arg("-c").arg("-g").arg("foo").arg("f"));
    assert_eq!(stdout(&out), "3\n");
    assert_eq!(code(&out), 0);
}

// Only-matching with no-group prints each match on its own line.
#[test]
fn only_matching_no_group() {
    let dir = WorkDir::new("only_matching");
    let out = dir.pipe(
        dir.command().arg("-o").arg("-g").arg(r"\w+"),
        b"one two three\n",
    );
    assert_eq!(stdout(&out), "one\ntwo\nthree\n");
    assert_eq!(code(&out), 0);
}

// -o spans interleaved with the gaps reconstruct the line.
#[test]
fn only_matching_spans_reconstruct() {
    let dir = WorkDir::new("only_matching_recon");
    let line = "alpha beta gamma";
    let out = dir.pipe(
        dir.command().arg("-o").arg(r"\w+"),
        format!("{}\n", line).as_bytes(),
    );
    let words: Vec<&str> = line.split(' ').collect();
    assert_eq!(stdout(&out), format!("{}\n", words.join("\n")));
}

// Context lines use `-` separators while matched lines use `:`.
#[test]
fn context_with_line_numbers() {
    let dir = WorkDir::new("context");
    let out = dir.pipe(
        dir.command().arg("-n").arg("-A").arg("1").arg("-B").arg("1").arg("world"),
        b"hello\nworld\n",
    );
    assert_eq!(stdout(&out), "1-hello\n2:world\n");
    assert_eq!(code(&out), 0);
}

// Every context line emitted by -A/-B is within the requested distance
// of some matching line.
#[test]
fn context_blocks_and_separator() {
    let dir = WorkDir::new("context_blocks");
    dir.create("f", b"m\nx\ny\nz\nw\nm\n");
    let out = dir.output(
        dir.command().arg("-n").arg("-A").arg("1").arg("-B").arg("1").arg("m").arg("f"),
    );
    assert_eq!(stdout(&out), "1:m\n2-x\n--\n5-w\n6:m\n");
}

#[test]
fn group_separator_configurable() {
    let dir = WorkDir::new("group_sep");
    dir.create("f", b"m\nx\ny\nz\nw\nm\n");
    let out = dir.output(
        dir.command()
            .arg("-A")
            .arg("1")
            .arg("--group-separator=@@")
            .arg("m")
            .arg("f"),
    );
    assert_eq!(stdout(&out), "m\nx\n@@\nm\n");

    let out = dir.output(
        dir.command()
            .arg("-A")
            .arg("1")
            .arg("--no-group-separator")
            .arg("m")
            .arg("f"),
    );
    assert_eq!(stdout(&out), "m\nx\nm\n");
}

// Listing modes print one file name per line, or NUL terminated with -Z.
#[test]
fn files_with_matches() {
    let dir = WorkDir::new("files_with");
    dir.create("one.txt", b"match\n");
    dir.create("two.txt", b"match\n");
    let out = dir.output(
        dir.command().arg("-l").arg("match").arg("one.txt").arg("two.txt"),
    );
    assert_eq!(sort_lines(&stdout(&out)), vec!["one.txt", "two.txt"]);
    assert_eq!(code(&out), 0);

    let out = dir.output(
        dir.command()
            .arg("-l")
            .arg("-Z")
            .arg("match")
            .arg("one.txt")
            .arg("two.txt"),
    );
    let raw = stdout(&out);
    let mut names: Vec<&str> =
        raw.split('\0').filter(|s| !s.is_empty()).collect();
    names.sort();
    assert_eq!(names, vec!["one.txt", "two.txt"]);
}

#[test]
fn files_without_match() {
    let dir = WorkDir::new("files_without");
    dir.create("one.txt", b"match\n");
    dir.create("two.txt", b"nothing\n");
    let out = dir.output(
        dir.command().arg("-L").arg("match").arg("one.txt").arg("two.txt"),
    );
    assert_eq!(stdout(&out), "two.txt\n");
}

// The default binary policy reports the file and stops; text mode
// prints the raw bytes.
#[test]
fn binary_policy() {
    let dir = WorkDir::new("binary");
    dir.create("blob", b"abc\x00def\n");
    let out = dir.output(dir.command().arg("def").arg("blob"));
    assert_eq!(stdout(&out), "Binary file blob matches\n");
    assert_eq!(code(&out), 0);

    let out = dir.output(dir.command().arg("-a").arg("def").arg("blob"));
    assert_eq!(out.stdout, b"abc\x00def\n");
    assert_eq!(code(&out), 0);
}

#[test]
fn binary_without_match_suppresses() {
    let dir = WorkDir::new("binary_wm");
    dir.create("blob", b"\x00abc\ndef\n");
    let out = dir.output(dir.command().arg("-I").arg("def").arg("blob"));
    assert_eq!(stdout(&out), "");
    assert_eq!(code(&out), 1);
}

// Inversion selects exactly the complement of the lines the normal run
// selects.
#[test]
fn invert_complements() {
    let dir = WorkDir::new("invert");
    let input: &[u8] = b"apple\nbanana\ncherry\napricot\n";
    dir.create("f", input);

    let normal = dir.output(dir.command().arg("^a").arg("f"));
    let inverted = dir.output(dir.command().arg("-v").arg("^a").arg("f"));
    assert_eq!(stdout(&normal), "apple\napricot\n");
    assert_eq!(stdout(&inverted), "banana\ncherry\n");

    let all = input.len();
    assert_eq!(
        normal.stdout.len() + inverted.stdout.len(),
        all,
        "the two runs must partition the input"
    );
}

#[test]
fn max_count_limits_lines() {
    let dir = WorkDir::new("max_count");
    dir.create("f", b"x\nx\nx\nx\n");
    let out =
        dir.output(dir.command().arg("-m").arg("2").arg("x").arg("f"));
    assert_eq!(stdout(&out), "x\nx\n");
}

#[test]
fn max_files_limits_session() {
    let dir = WorkDir::new("max_files");
    dir.create("a.txt", b"x\n");
    dir.create("b.txt", b"x\n");
    dir.create("c.txt", b"x\n");
    let out = dir.output(
        dir.command().arg("-l").arg("--max-files").arg("2").arg("-r").arg("x"),
    );
    assert_eq!(sort_lines(&stdout(&out)).len(), 2);
}

// Filenames are shown automatically when searching more than one file,
// and -h suppresses them.
#[test]
fn filename_display_rules() {
    let dir = WorkDir::new("filenames");
    dir.create("a.txt", b"x\n");
    dir.create("b.txt", b"x\n");

    let out = dir.output(dir.command().arg("x").arg("a.txt"));
    assert_eq!(stdout(&out), "x\n");

    let out =
        dir.output(dir.command().arg("x").arg("a.txt").arg("b.txt"));
    assert_eq!(sort_lines(&stdout(&out)), vec!["a.txt:x", "b.txt:x"]);

    let out = dir.output(
        dir.command().arg("-h").arg("x").arg("a.txt").arg("b.txt"),
    );
    assert_eq!(stdout(&out), "x\nx\n");
}

#[test]
fn recursive_with_includes() {
    let dir = WorkDir::new("recursive");
    dir.create("src/keep.rs", b"needle\n");
    dir.create("src/skip.c", b"needle\n");
    dir.create("docs/also.rs", b"needle\n");
    let out = dir.output(
        dir.command()
            .arg("-r")
            .arg("-l")
            .arg("--include=*.rs")
            .arg("needle"),
    );
    assert_eq!(
        sort_lines(&stdout(&out)),
        vec!["docs/also.rs", "src/keep.rs"]
    );
}

#[test]
fn exclude_dir_prunes() {
    let dir = WorkDir::new("exclude_dir");
    dir.create("src/a.txt", b"needle\n");
    dir.create("target/b.txt", b"needle\n");
    let out = dir.output(
        dir.command()
            .arg("-r")
            .arg("-l")
            .arg("--exclude-dir=target")
            .arg("needle"),
    );
    assert_eq!(stdout(&out), "src/a.txt\n");
}

#[test]
fn line_and_column_numbers() {
    let dir = WorkDir::new("line_column");
    dir.create("f", b"hello\n  world\n");
    let out = dir.output(
        dir.command().arg("-n").arg("-k").arg("world").arg("f"),
    );
    assert_eq!(stdout(&out), "2:3:  world\n");
}

#[test]
fn byte_offset_field() {
    let dir = WorkDir::new("byte_offset");
    dir.create("f", b"hello\nworld\n");
    let out =
        dir.output(dir.command().arg("-b").arg("world").arg("f"));
    assert_eq!(stdout(&out), "6:world\n");
}

#[test]
fn fixed_strings_literal() {
    let dir = WorkDir::new("fixed");
    dir.create("f", b"a+b\naxb\n");
    let out =
        dir.output(dir.command().arg("-F").arg("a+b").arg("f"));
    assert_eq!(stdout(&out), "a+b\n");
}

#[test]
fn basic_regex_translation() {
    let dir = WorkDir::new("basic");
    dir.create("f", b"abab\nxyz\n");
    let out = dir.output(
        dir.command().arg("-G").arg(r"\(ab\)\{2\}").arg("f"),
    );
    assert_eq!(stdout(&out), "abab\n");
}

#[test]
fn word_and_line_regexp() {
    let dir = WorkDir::new("word_line");
    dir.create("f", b"foo\nfoobar\nbar foo baz\n");
    let out = dir.output(dir.command().arg("-w").arg("foo").arg("f"));
    assert_eq!(stdout(&out), "foo\nbar foo baz\n");

    let out = dir.output(dir.command().arg("-x").arg("foo").arg("f"));
    assert_eq!(stdout(&out), "foo\n");
}

#[test]
fn smart_case() {
    let dir = WorkDir::new("smart_case");
    dir.create("f", b"Foo\nfoo\n");
    let out = dir.output(dir.command().arg("-j").arg("foo").arg("f"));
    assert_eq!(stdout(&out), "Foo\nfoo\n");

    let out = dir.output(dir.command().arg("-j").arg("Foo").arg("f"));
    assert_eq!(stdout(&out), "Foo\n");
}

#[test]
fn quiet_mode() {
    let dir = WorkDir::new("quiet");
    dir.create("f", b"needle\n");
    let out = dir.output(dir.command().arg("-q").arg("needle").arg("f"));
    assert_eq!(stdout(&out), "");
    assert_eq!(code(&out), 0);

    let out = dir.output(dir.command().arg("-q").arg("nothing").arg("f"));
    assert_eq!(stdout(&out), "");
    assert_eq!(code(&out), 1);
}

#[test]
fn no_pattern_is_usage_error() {
    let dir = WorkDir::new("no_pattern");
    let out = dir.output(&mut dir.command());
    assert_eq!(code(&out), 2);
}

#[test]
fn unreadable_file_warns_and_continues() {
    let dir = WorkDir::new("unreadable");
    dir.create("good", b"needle\n");
    let out = dir.output(
        dir.command().arg("needle").arg("missing").arg("good"),
    );
    // The session still reports the match, but the exit code records
    // that an error occurred.
    assert_eq!(stdout(&out), "good:needle\n");
    assert_eq!(code(&out), 2);
    assert!(!out.stderr.is_empty());
}

#[test]
fn any_line_passthrough() {
    let dir = WorkDir::new("any_line");
    dir.create("f", b"one\ntwo\nthree\n");
    let out = dir.output(dir.command().arg("-y").arg("two").arg("f"));
    assert_eq!(stdout(&out), "one\ntwo\nthree\n");
    assert_eq!(code(&out), 0);
}

#[test]
fn only_line_number_mode() {
    let dir = WorkDir::new("only_line_number");
    dir.create("f", b"a\nb\nb\n");
    let out = dir.output(dir.command().arg("-N").arg("b").arg("f"));
    assert_eq!(stdout(&out), "2:\n3:\n");
}

#[test]
fn hex_mode_rows() {
    let dir = WorkDir::new("hex");
    dir.create("f", b"hello world\n");
    let out =
        dir.output(dir.command().arg("-X").arg("world").arg("f"));
    let expected = "\
00000000:  68 65 6c 6c 6f 20 77 6f 72 6c 64 0a -- -- -- --  hello world ----
";
    assert_eq!(stdout(&out), expected);
}

#[test]
fn break_between_files() {
    let dir = WorkDir::new("break");
    dir.create("a.txt", b"x\n");
    dir.create("b.txt", b"x\n");
    let out = dir.output(
        dir.command()
            .arg("--break")
            .arg("-h")
            .arg("x")
            .arg("a.txt")
            .arg("b.txt"),
    );
    assert_eq!(stdout(&out), "x\n\nx\n\n");
}

#[test]
fn separator_option() {
    let dir = WorkDir::new("separator");
    dir.create("f", b"x\n");
    let out = dir.output(
        dir.command().arg("-n").arg("--separator=|").arg("x").arg("f"),
    );
    assert_eq!(stdout(&out), "1|x\n");
}

#[test]
fn encoding_utf16() {
    let dir = WorkDir::new("encoding");
    // "foo\n" in UTF-16LE with a BOM.
    dir.create("f", b"\xFF\xFEf\x00o\x00o\x00\n\x00");
    let out = dir.output(
        dir.command().arg("-Q").arg("utf-16").arg("foo").arg("f"),
    );
    assert_eq!(stdout(&out), "foo\n");
    assert_eq!(code(&out), 0);
}

#[test]
fn type_list_prints_table() {
    let dir = WorkDir::new("type_list");
    let out = dir.output(dir.command().arg("-t").arg("list"));
    let text = stdout(&out);
    assert!(text.contains("rust"));
    assert!(text.contains("-O"));
    assert_eq!(code(&out), 0);
}

#[test]
fn file_type_selects_extensions() {
    let dir = WorkDir::new("file_type");
    dir.create("lib.rs", b"needle\n");
    dir.create("lib.c", b"needle\n");
    let out = dir.output(
        dir.command().arg("-r").arg("-l").arg("-t").arg("rust").arg("needle"),
    );
    assert_eq!(stdout(&out), "lib.rs\n");
}
