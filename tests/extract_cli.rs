//! End-to-end tests for `ordwin extract`.
//!
//! Tests cover:
//! 1. Pass-through of sorted input with the window allowance recorded
//! 2. Unordered contigs stopping the run after the flushed prefix
//! 3. Region exclusion
//! 4. Contig selection with --seq
//! 5. Bgzipped input, and rejection of plain gzip

use std::io::Write;
use std::process::{Command, Output};
use tempfile::NamedTempFile;

const HEADER: &str = "##fileformat=VCFv4.2\n\
                      ##contig=<ID=20,length=64444167>\n\
                      ##contig=<ID=21,length=46709983>\n\
                      #CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n";

/// Helper to create a temporary file with the given content.
fn create_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", content).unwrap();
    file.flush().unwrap();
    file
}

fn create_vcf(body: &str) -> NamedTempFile {
    create_file(&format!("{}{}", HEADER, body))
}

fn run_ordwin(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ordwin"))
        .args(args)
        .output()
        .expect("Failed to run ordwin")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// Data lines of a VCF, without the header.
fn data_lines(vcf: &str) -> Vec<&str> {
    vcf.lines().filter(|l| !l.starts_with('#')).collect()
}

#[test]
fn test_extract_passes_sorted_input_through() {
    let body = "20\t100\t.\tA\tG\t.\tPASS\t.\n\
                20\t100\t.\tAT\tA\t.\tPASS\t.\n\
                20\t6000\t.\tC\tT\t.\tPASS\t.\n\
                21\t5\t.\tG\tC\t.\tPASS\t.\n";
    let vcf = create_vcf(body);

    let output = run_ordwin(&["extract", "-i", vcf.path().to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    assert_eq!(data_lines(&out), body.lines().collect::<Vec<_>>());

    let header: Vec<&str> = out.lines().filter(|l| l.starts_with('#')).collect();
    assert_eq!(header.len(), 5);
    assert_eq!(header[3], "##ordwin_window_allowance=5000");
    assert!(header[4].starts_with("#CHROM"));
}

#[test]
fn test_extract_reports_overlapping_pairs() {
    let body = "20\t100\t.\tACGT\tA\t.\tPASS\t.\n\
                20\t102\t.\tG\tC\t.\tPASS\t.\n\
                20\t200\t.\tA\tT\t.\tPASS\t.\n";
    let vcf = create_vcf(body);

    let output = run_ordwin(&["extract", "-i", vcf.path().to_str().unwrap(), "--stats"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let err = stderr(&output);
    assert!(err.contains("Read: 3"), "stderr: {}", err);
    assert!(err.contains("Written: 3"), "stderr: {}", err);
    assert!(err.contains("Overlapping pairs: 1"), "stderr: {}", err);
}

#[test]
fn test_extract_unordered_contigs_keep_flushed_prefix() {
    // Header declares 20 before 21, so the second block steps back a contig
    let body = "21\t100\t.\tA\tG\t.\tPASS\t.\n\
                21\t10000\t.\tC\tT\t.\tPASS\t.\n\
                20\t100\t.\tG\tA\t.\tPASS\t.\n";
    let vcf = create_vcf(body);

    let output = run_ordwin(&["extract", "-i", vcf.path().to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("unordered"), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    assert_eq!(data_lines(&out), vec!["21\t100\t.\tA\tG\t.\tPASS\t."]);
}

#[test]
fn test_extract_interleaved_contigs_rejected_up_front() {
    let body = "20\t100\t.\tA\tG\t.\tPASS\t.\n\
                21\t100\t.\tC\tT\t.\tPASS\t.\n\
                20\t200\t.\tG\tA\t.\tPASS\t.\n";
    let vcf = create_vcf(body);

    let output = run_ordwin(&["extract", "-i", vcf.path().to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("was seen earlier"));
    assert!(stdout(&output).is_empty());
}

#[test]
fn test_extract_excludes_regions() {
    let vcf = create_vcf(
        "20\t100\t.\tA\tG\t.\tPASS\t.\n\
         20\t150\t.\tC\tT\t.\tPASS\t.\n\
         20\t300\t.\tG\tA\t.\tPASS\t.\n",
    );
    // 0-based half-open: covers 150-200 in 1-based coordinates
    let bed = create_file("20\t149\t200\n");

    let output = run_ordwin(&[
        "extract",
        "-i",
        vcf.path().to_str().unwrap(),
        "--exclude",
        bed.path().to_str().unwrap(),
        "--stats",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let positions: Vec<String> = data_lines(&stdout(&output))
        .iter()
        .map(|l| l.split('\t').nth(1).unwrap().to_string())
        .collect();
    assert_eq!(positions, vec!["100", "300"]);
    assert!(stderr(&output).contains("Excluded variants: 1"));
}

#[test]
fn test_extract_selected_sequences() {
    let vcf = create_vcf(
        "20\t100\t.\tA\tG\t.\tPASS\t.\n\
         21\t5\t.\tC\tT\t.\tPASS\t.\n\
         21\t9\t.\tG\tA\t.\tPASS\t.\n",
    );

    let output = run_ordwin(&[
        "extract",
        "-i",
        vcf.path().to_str().unwrap(),
        "--seq",
        "21",
        "--seq",
        "chrUn",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    let chroms: Vec<&str> = data_lines(&out)
        .iter()
        .map(|l| l.split('\t').next().unwrap())
        .collect();
    assert_eq!(chroms, vec!["21", "21"]);
}

#[test]
fn test_extract_writes_output_file() {
    let vcf = create_vcf("20\t100\t.\tA\tG\t.\tPASS\t.\n");
    let out = NamedTempFile::new().unwrap();

    let output = run_ordwin(&[
        "extract",
        "-i",
        vcf.path().to_str().unwrap(),
        "-o",
        out.path().to_str().unwrap(),
        "-w",
        "10",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).is_empty());

    let written = std::fs::read_to_string(out.path()).unwrap();
    assert!(written.contains("##ordwin_window_allowance=10\n"));
    assert_eq!(data_lines(&written), vec!["20\t100\t.\tA\tG\t.\tPASS\t."]);
}

#[test]
fn test_extract_missing_input_fails() {
    let output = run_ordwin(&["extract", "-i", "/nonexistent/input.vcf"]);
    assert!(!output.status.success());
    assert!(stderr(&output).starts_with("Error:"));
}

#[test]
fn test_extract_bgzipped_input_with_seq() {
    let body = "20\t100\t.\tA\tG\t.\tPASS\t.\n\
                21\t5\t.\tG\tC\t.\tPASS\t.\n\
                21\t9\t.\tT\tA\t.\tPASS\t.\n";
    let vcf = NamedTempFile::new().unwrap();
    let mut writer = noodles::bgzf::io::Writer::new(vcf.reopen().unwrap());
    writer.write_all(HEADER.as_bytes()).unwrap();
    writer.write_all(body.as_bytes()).unwrap();
    writer.finish().unwrap();

    let output = run_ordwin(&[
        "extract",
        "-i",
        vcf.path().to_str().unwrap(),
        "--seq",
        "21",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        data_lines(&stdout(&output)),
        vec!["21\t5\t.\tG\tC\t.\tPASS\t.", "21\t9\t.\tT\tA\t.\tPASS\t."]
    );
}

#[test]
fn test_extract_plain_gzip_rejected() {
    let gz = NamedTempFile::new().unwrap();
    gz.as_file()
        .write_all(&[0x1f, 0x8b, 0x08, 0x00, 0, 0, 0, 0, 0, 0xff, 0x03, 0x00])
        .unwrap();

    let output = run_ordwin(&["extract", "-i", gz.path().to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("not BGZF"));
}
