use assert_cmd::prelude::*; // Add methods on commands
use std::process::Command; // Run programs
use std::io::Write;
type STDRESULT = Result<(),Box<dyn std::error::Error>>;

fn round_trip(data: &[u8], maxbits: &str) -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let in_path = temp_dir.path().join("plain.txt");
    let z_path = temp_dir.path().join("plain.txt.Z");
    let out_path = temp_dir.path().join("plain.txt.out");

    let mut in_file = std::fs::File::create(&in_path)?;
    in_file.write_all(data)?;
    drop(in_file);

    Command::cargo_bin("retrocompress")?
        .arg("compress")
        .arg("-b").arg(maxbits)
        .arg("-i").arg(&in_path)
        .arg("-o").arg(&z_path)
        .assert()
        .success();

    let compressed = std::fs::read(&z_path)?;
    assert_eq!(&compressed[0..2],&[0x1F,0x9D]);

    Command::cargo_bin("retrocompress")?
        .arg("decompress")
        .arg("-i").arg(&z_path)
        .arg("-o").arg(&out_path)
        .assert()
        .success();

    let expanded = std::fs::read(&out_path)?;
    assert_eq!(expanded,data);
    Ok(())
}

#[test]
fn round_trip_small_text() -> STDRESULT {
    round_trip(b"TOBEORNOTTOBEORTOBEORNOT","16")
}

#[test]
fn round_trip_narrow_width() -> STDRESULT {
    round_trip("the quick brown fox jumps over the lazy dog ".repeat(200).as_bytes(),"9")
}

#[test]
fn round_trip_empty_file() -> STDRESULT {
    round_trip(b"","12")
}

#[test]
fn compress_missing_input_fails() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let missing = temp_dir.path().join("does_not_exist");
    let out_path = temp_dir.path().join("out.Z");
    Command::cargo_bin("retrocompress")?
        .arg("compress")
        .arg("-i").arg(&missing)
        .arg("-o").arg(&out_path)
        .assert()
        .failure();
    Ok(())
}
