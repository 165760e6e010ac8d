use std::{
    env,
    io::{self, BufRead, Write},
    process::exit,
};

use cpx400dp::{
    client::InstrumentClient,
    data::{Reading, Unit},
    error::Result,
    protocol::{Backend, DOCUMENTATION_URL, SerialBackend},
};
use env_logger::{Env, Target};
use log::{error, info};

fn usage() {
    println!("cpx400dp {}", cpx400dp::version());
    println!("Usage: ... <port> <command> [args]");
    println!("  <port>:");
    println!("    auto: find the single attached CPX400DP");
    println!("    PATH or PATH:BAUD, e.g. /dev/ttyACM0 or COM3:9600");
    println!("  <command>:");
    println!("    ports                  list serial ports (no <port> needed)");
    println!("    idn                    identification");
    println!("    set-voltage CH VOLTS   program voltage");
    println!("    set-current CH AMPS    program current limit");
    println!("    on CH | off CH         switch output");
    println!("    status CH              output state");
    println!("    get-voltage CH         programmed voltage");
    println!("    get-current CH         programmed current limit");
    println!("    read-voltage CH        measured voltage");
    println!("    read-current CH        measured current");
    println!("    lock | unlock          front panel lock");
    println!("  Command reference: {DOCUMENTATION_URL}");
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("debug"))
        .target(Target::Stdout)
        .format_timestamp_millis()
        .init();

    let args: Vec<String> = env::args().collect();

    let res = match args.get(1).map(String::as_str) {
        Some("ports") => list_ports(),
        Some(port) if args.len() >= 3 => run(port, &args[2], &args[3..]),
        _ => {
            usage();
            exit(1);
        }
    };

    if let Err(e) = res {
        error!("The program could no longer continue due to {e}");
        print!("Press enter to exit.");
        let _ = io::stdout().flush();
        let _ = io::stdin().lock().read_line(&mut String::new());
        exit(1);
    }
}

fn list_ports() -> Result<(), Box<dyn std::error::Error>> {
    for port in SerialBackend::new().enumerate()? {
        let marker = if port.is_cpx400dp() { "*" } else { " " };
        println!("{marker} {}  {}", port.device, port.hwid);
    }
    Ok(())
}

fn run(port: &str, cmd: &str, params: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let mut psu = InstrumentClient::new();
    if port == "auto" {
        psu.discover_and_connect()?;
    } else {
        match port.rsplit_once(':') {
            Some((path, baud)) => psu.connect_with_baud(path, baud.parse()?)?,
            None => psu.connect(port)?,
        }
    }
    info!("Connected to {}", psu.port().unwrap_or_default());

    let res = execute(&mut psu, cmd, params);
    psu.disconnect()?;
    res
}

fn execute(
    psu: &mut InstrumentClient,
    cmd: &str,
    params: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let channel = || -> Result<u8, Box<dyn std::error::Error>> {
        Ok(params.first().ok_or("missing channel")?.parse()?)
    };
    let value = || -> Result<f64, Box<dyn std::error::Error>> {
        Ok(params.get(1).ok_or("missing value")?.parse()?)
    };

    match cmd {
        "idn" => println!("{}", psu.get_identification()?),
        "set-voltage" => psu.set_voltage(value()?, channel()?)?,
        "set-current" => psu.set_current(value()?, channel()?)?,
        "on" => psu.enable_output(channel()?)?,
        "off" => psu.disable_output(channel()?)?,
        "status" => println!("{}", psu.get_output_status(channel()?)?),
        "get-voltage" => print_reading(Unit::Voltage, psu.get_set_voltage(channel()?)?),
        "get-current" => print_reading(Unit::Current, psu.get_set_current(channel()?)?),
        "read-voltage" => print_reading(Unit::Voltage, psu.get_output_voltage(channel()?)?),
        "read-current" => print_reading(Unit::Current, psu.get_output_current(channel()?)?),
        "lock" => psu.lock(),
        "unlock" => psu.unlock(),
        _ => return Err(format!("Command '{cmd}' not supported").into()),
    }

    Ok(())
}

fn print_reading(unit: Unit, value: f64) {
    println!("{}", Reading::new(unit, value));
}
