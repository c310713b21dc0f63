use clap::{arg,crate_version,Command};
use retrocompress::lzw;

const RCH: &str = "unreachable was reached";

fn main() -> Result<(),Box<dyn std::error::Error>>
{
    let long_help =
"Examples:
---------
Compress:      `retrocompress compress -i myfile -o myfile.Z`
Decompress:    `retrocompress decompress -i myfile.Z -o myfile`";

    let mut main_cmd = Command::new("retrocompress")
        .about("Compress and decompress files in the classical compress(1) .Z format")
        .after_long_help(long_help)
        .version(crate_version!());
    main_cmd = main_cmd.subcommand(Command::new("compress")
        .arg(arg!(-i --input <PATH> "input path").required(true))
        .arg(arg!(-o --output <PATH> "output path").required(true))
        .arg(arg!(-b --bits <MAXBITS> "maximum code width, 9 to 16").default_value("16"))
        .about("compress a file into the .Z format"));

    main_cmd = main_cmd.subcommand(Command::new("decompress")
        .arg(arg!(-i --input <PATH> "input path").required(true))
        .arg(arg!(-o --output <PATH> "output path").required(true))
        .about("decompress a .Z file"));

    let matches = main_cmd.get_matches();

    env_logger::init();

    if let Some(cmd) = matches.subcommand_matches("compress") {
        let path_in = cmd.get_one::<String>("input").expect(RCH);
        let path_out = cmd.get_one::<String>("output").expect(RCH);
        let maxbits: u32 = cmd.get_one::<String>("bits").expect(RCH).parse()?;
        let mut in_file = std::fs::File::open(path_in)?;
        let mut out_file = std::fs::File::create(path_out)?;
        let ratio = lzw::encode(&mut in_file,&mut out_file,maxbits)?;
        log::info!("compression ratio: {:.3}",ratio);
    }

    if let Some(cmd) = matches.subcommand_matches("decompress") {
        let path_in = cmd.get_one::<String>("input").expect(RCH);
        let path_out = cmd.get_one::<String>("output").expect(RCH);
        let mut in_file = std::fs::File::open(path_in)?;
        let mut out_file = std::fs::File::create(path_out)?;
        let ratio = lzw::decode(&mut in_file,&mut out_file,&[])?;
        log::info!("compression ratio: {:.3}",ratio);
    }

    Ok(())
}
