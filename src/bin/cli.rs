//! trainstation CLI Client
//!
//! Line-mode client: sends each stdin line as a command and prints the framed
//! response. `EXIT` or end of input quits.

use std::io::{self, BufRead, BufReader, Write};
use std::net::TcpStream;

use clap::Parser;
use trainstation::protocol::{read_response, write_request};

/// trainstation CLI
#[derive(Parser, Debug)]
#[command(name = "trainstation-cli")]
#[command(about = "Interactive client for the trainstation server")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    server: String,
}

const MENU: &str = "\
 AVAILABLE COMMANDS:
 [1] SCHEDULE
 [2] DEPARTURES
 [3] ARRIVALS
 [4] UPDATE <ID> <Delay>
 [5] CANCEL <ID>
 [6] DETAILS <ID>
 [7] REPORT <Msg>
 [8] ESTIMATE <ID> <KM>
 [9] STATS / RESET [ID] / RELOAD
 [10] EXIT";

fn main() {
    let args = Args::parse();

    let stream = match TcpStream::connect(&args.server) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("connect {}: {}", args.server, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(stream) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run(stream: TcpStream) -> trainstation::Result<()> {
    let mut writer = stream.try_clone()?;
    let mut reader = BufReader::new(stream);

    println!("CONNECTED TO TRAIN SERVER");
    println!("{}", MENU);

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut line = String::new();

    loop {
        print!("> ");
        io::stdout().flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let command = line.trim_end_matches(&['\r', '\n'][..]);
        if command == "EXIT" {
            break;
        }
        if command.is_empty() {
            continue;
        }

        write_request(&mut writer, command)?;
        match read_response(&mut reader)? {
            Some(body) => println!("{}", body),
            None => {
                println!("Server disconnected.");
                break;
            }
        }
    }

    Ok(())
}
