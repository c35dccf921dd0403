use declargs::{Arg, Command, NumLimit, NumType};
use std::io::{Read, Write};
use std::time::Instant;
use tracing_subscriber::{fmt, EnvFilter};

fn bufsize() -> Result<Arg, declargs::Error> {
    Arg::optional()
        .short_name('b')?
        .long_name("bufsize")?
        .range(NumType::Uint, "1", NumLimit::UINT32_MAX)?
        .default_value("4096")
}

fn cli() -> Result<Command, declargs::Error> {
    let read = Command::new("read")
        .usage("iotime read [-b SIZE] FILE")
        .arg(bufsize()?)?
        .arg(Arg::positional())?;

    let write = Command::new("write")
        .usage_lines([
            "iotime write [-b SIZE] [-n COUNT] [--sync | --no-sync] FILE",
            "  -n, --count  number of buffers to write",
        ])
        .arg(bufsize()?)?
        .arg(
            Arg::optional()
                .short_name('n')?
                .long_name("count")?
                .range_with(NumType::Int, "0", NumLimit::INT32_MAX, false, true)?
                .default_value("256")?,
        )?
        .arg(Arg::flag().long_name("sync")?)?
        .arg(Arg::flag().long_name("no-sync")?)?
        .conflict_group(["sync", "no-sync"])
        .arg(Arg::positional())?;

    Ok(Command::new("iotime")
        .usage_lines([
            "Usage: iotime [-v] [--unit UNIT] <read|write> ...",
            "  --unit  one of s, ms, us (default ms)",
        ])
        .arg(Arg::flag().short_name('v')?.long_name("verbose")?)?
        .arg(
            Arg::optional()
                .long_name("unit")?
                .choices(["s", "ms", "us"])?
                .default_value("ms")?,
        )?
        .subcommand(read)
        .subcommand(write))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let mut cmd = cli()?;
    // Built with `exit-on-error`: help and bad input end the process here.
    cmd.process(std::env::args())?;

    let unit: &str = cmd.get_one("unit")?;
    let sub = cmd.get_subcommand()?;
    let path: &str = sub.get_one_position(0)?;
    let bufsize: u32 = sub.get_one("bufsize")?;
    let mut buf = vec![0u8; bufsize as usize];

    let start = Instant::now();
    let bytes = match sub.name() {
        "read" => {
            let mut file = std::fs::File::open(path)?;
            let mut total = 0;
            loop {
                let n = file.read(&mut buf)?;
                if n == 0 {
                    break total;
                }
                total += n;
            }
        }
        _ => {
            let count: i32 = sub.get_one('n')?;
            let mut file = std::fs::File::create(path)?;
            for _ in 0..count {
                file.write_all(&buf)?;
            }
            if sub.has("sync") {
                file.sync_all()?;
            }
            buf.len() * count as usize
        }
    };
    let elapsed = start.elapsed();
    let elapsed = match unit {
        "s" => format!("{:.3}s", elapsed.as_secs_f64()),
        "us" => format!("{}us", elapsed.as_micros()),
        _ => format!("{}ms", elapsed.as_millis()),
    };
    if cmd.has('v') {
        eprintln!("{} {} bytes of {} in {}", sub.name(), bytes, path, elapsed);
    } else {
        println!("{}", elapsed);
    }
    Ok(())
}
