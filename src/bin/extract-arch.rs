//! Bundle an architecture and every custom component it uses into a zip
//! archive that can be extracted into another player's save directory.
//!
//! The archive is named after the architecture and its gate and delay
//! scores, e.g. `overture_1234_56.zip`.

use clap::Parser;
use std::{
    error,
    fs::{self, File},
    io::{BufWriter, Write},
    path::PathBuf,
};
use tcsave::{
    install::{self, SaveDirectory},
    logging::{init_logging, LogConfig},
    Packager,
};

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Folder of the architecture under schematics/architecture
    arch_name: String,

    /// Include levels.txt in the archive
    #[arg(long)]
    scores: bool,

    /// The game's save directory
    #[arg(long, env = "TC_SAVE_DIR")]
    save_dir: Option<PathBuf>,

    /// Directory to write the archive into
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Log more (-v files added, -vv dependencies, -vvv component catalog)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<(), Box<dyn error::Error>> {
    let args = Args::parse();
    init_logging(&LogConfig::from_verbosity(args.verbose))?;

    let save = match args.save_dir {
        Some(dir) => SaveDirectory::new(dir),
        None => SaveDirectory::locate()
            .ok_or("unable to locate the save directory, pass --save-dir")?,
    };

    let arch = fs::read(save.architecture(&args.arch_name))?;
    let scores = if args.scores {
        Some(fs::read(save.scores())?)
    } else {
        None
    };

    let files = save.read_components()?;
    let catalog = install::catalog(&files)?;

    let mut packager = Packager::new(args.arch_name.as_str());
    if let Some(scores) = &scores {
        packager = packager.scores(scores);
    }

    let plan = packager.plan(&arch, &catalog)?;
    let path = args.output.join(plan.archive_name());
    let mut writer = plan.write_zip(BufWriter::new(File::create(&path)?))?;
    writer.flush()?;

    println!("Wrote {}", path.display());
    Ok(())
}
