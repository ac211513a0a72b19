use std::{fs, process::Command, time::Duration};

use time_humanize::{Accuracy, HumanTime, Tense};

/// Hardware model reported on the About screen.
pub const DEVICE_MODEL: &str = "Zero";

const SERIAL_DEFAULT: &str = "DEV000000000";
const SERIAL_ERROR: &str = "ERROR000000000";
const READ_ERROR: &str = "ERROR";

/// Board serial from `/proc/cpuinfo`.  Falls back to a development serial
/// when the board does not report one, and to an error sentinel when the
/// file cannot be read at all.
pub fn serial_number() -> String {
    match fs::read_to_string("/proc/cpuinfo") {
        Ok(text) => parse_serial(&text),
        Err(_) => SERIAL_ERROR.to_string(),
    }
}

pub fn os_version() -> String {
    match fs::read_to_string("/proc/version") {
        Ok(text) => parse_os_version(&text),
        Err(_) => READ_ERROR.to_string(),
    }
}

pub fn uptime() -> String {
    match fs::read_to_string("/proc/uptime") {
        Ok(text) => parse_uptime(&text),
        Err(_) => READ_ERROR.to_string(),
    }
}

/// Size of the root filesystem, as reported by `df -h`.
pub fn disk_capacity() -> String {
    let output = Command::new("df").args(["-h", "/"]).output();
    match output {
        Ok(output) if output.status.success() => {
            parse_df_capacity(&String::from_utf8_lossy(&output.stdout))
        }
        _ => READ_ERROR.to_string(),
    }
}

fn parse_serial(cpuinfo: &str) -> String {
    cpuinfo
        .lines()
        .filter(|line| line.starts_with("Serial"))
        .last()
        .and_then(|line| line.get(10..26))
        .map(str::to_string)
        .unwrap_or_else(|| SERIAL_DEFAULT.to_string())
}

fn parse_os_version(text: &str) -> String {
    // Strip the "Linux version " prefix.
    text.lines()
        .last()
        .and_then(|line| line.get(14..))
        .map(|rest| rest.trim_end().to_string())
        .unwrap_or_else(|| READ_ERROR.to_string())
}

fn parse_uptime(text: &str) -> String {
    let secs = text
        .split_whitespace()
        .next()
        .and_then(|field| field.parse::<f64>().ok())
        .filter(|secs| secs.is_finite() && *secs >= 0.0);
    match secs {
        Some(secs) => {
            HumanTime::from(Duration::from_secs_f64(secs)).to_text_en(Accuracy::Rough, Tense::Present)
        }
        None => READ_ERROR.to_string(),
    }
}

fn parse_df_capacity(df: &str) -> String {
    df.lines()
        .nth(1)
        .and_then(|line| line.split_whitespace().nth(1))
        .map(str::to_string)
        .unwrap_or_else(|| READ_ERROR.to_string())
}
