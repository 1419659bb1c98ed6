use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use vmu931_proto::{Command, Message, Status, Stream};
use vmu931_transport::{PortInfo, PortKind};

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

pub fn print_message(message: &Message, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(message),
        OutputFormat::Table => {
            let mut table = new_table(vec!["KIND", "TIMESTAMP", "VALUES"]);
            table.add_row(vec![
                message.kind().to_string(),
                timestamp_text(message),
                message_values(message),
            ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "{:<13} ts={:<10} {}",
                message.kind(),
                timestamp_text(message),
                message_values(message)
            );
        }
    }
}

pub fn print_status(status: &Status, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(status),
        OutputFormat::Table => {
            let mut table = new_table(vec!["FIELD", "VALUE"]);
            for (field, value) in status_rows(status) {
                table.add_row(vec![field.to_string(), value]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for (field, value) in status_rows(status) {
                println!("{field:<24} {value}");
            }
        }
    }
}

#[derive(Serialize)]
struct AppliedOutput<'a> {
    sent: Vec<String>,
    status: Option<&'a Status>,
}

/// Commands sent to reach a configuration, and the status read back.
pub fn print_applied(sent: &[Command], status: Option<&Status>, format: OutputFormat) {
    let names: Vec<String> = sent.iter().map(Command::to_string).collect();
    match format {
        OutputFormat::Json => print_json(&AppliedOutput {
            sent: names,
            status,
        }),
        OutputFormat::Table | OutputFormat::Pretty => {
            if names.is_empty() {
                println!("device already configured; nothing sent");
            } else {
                println!("sent: {}", names.join(", "));
            }
            if let Some(status) = status {
                print_status(status, format);
            }
        }
    }
}

#[derive(Serialize)]
struct SentOutput<'a> {
    command: String,
    bytes: String,
    status: Option<&'a Status>,
}

/// A command that was sent, and the status read back after it, if any.
pub fn print_sent(command: Command, status: Option<&Status>, format: OutputFormat) {
    let bytes = String::from_utf8_lossy(&command.encode()).into_owned();
    match format {
        OutputFormat::Json => print_json(&SentOutput {
            command: command.to_string(),
            bytes,
            status,
        }),
        OutputFormat::Table => {
            let mut table = new_table(vec!["COMMAND", "BYTES"]);
            table.add_row(vec![command.to_string(), bytes]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("sent {command} ({bytes})"),
    }
    if let (Some(status), OutputFormat::Table | OutputFormat::Pretty) = (status, format) {
        print_status(status, format);
    }
}

#[derive(Serialize)]
struct PortOutput<'a> {
    name: &'a str,
    kind: &'static str,
    vid: Option<String>,
    pid: Option<String>,
    product: Option<&'a str>,
}

impl<'a> From<&'a PortInfo> for PortOutput<'a> {
    fn from(port: &'a PortInfo) -> Self {
        let (kind, vid, pid) = match port.kind {
            PortKind::Usb { vid, pid } => (
                "usb",
                Some(format!("{vid:04x}")),
                Some(format!("{pid:04x}")),
            ),
            PortKind::Pci => ("pci", None, None),
            PortKind::Bluetooth => ("bluetooth", None, None),
            PortKind::Unknown => ("unknown", None, None),
        };
        Self {
            name: &port.name,
            kind,
            vid,
            pid,
            product: port.product.as_deref(),
        }
    }
}

pub fn print_ports(ports: &[PortInfo], format: OutputFormat) {
    let rows: Vec<PortOutput<'_>> = ports.iter().map(PortOutput::from).collect();
    match format {
        OutputFormat::Json => print_json(&rows),
        OutputFormat::Table => {
            let mut table = new_table(vec!["PORT", "KIND", "VID:PID", "PRODUCT"]);
            for row in &rows {
                table.add_row(vec![
                    row.name.to_string(),
                    row.kind.to_string(),
                    usb_id(row),
                    row.product.unwrap_or("-").to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            if rows.is_empty() {
                println!("no serial ports found");
            }
            for row in &rows {
                println!(
                    "{:<20} {:<10} {:<10} {}",
                    row.name,
                    row.kind,
                    usb_id(row),
                    row.product.unwrap_or("")
                );
            }
        }
    }
}

fn usb_id(row: &PortOutput<'_>) -> String {
    match (&row.vid, &row.pid) {
        (Some(vid), Some(pid)) => format!("{vid}:{pid}"),
        _ => "-".to_string(),
    }
}

fn timestamp_text(message: &Message) -> String {
    message
        .timestamp()
        .map(|ts| ts.to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn message_values(message: &Message) -> String {
    match message {
        Message::Quaternion(q) => format!(
            "w={:.4} x={:.4} y={:.4} z={:.4}",
            q.w, q.x, q.y, q.z
        ),
        Message::Euler(v)
        | Message::Accelerometer(v)
        | Message::Gyroscope(v)
        | Message::Magnetometer(v) => format!("x={:.4} y={:.4} z={:.4}", v.x, v.y, v.z),
        Message::Heading(h) => format!("h={:.2}", h.h),
        Message::Status(status) => {
            let streams: Vec<&str> = status
                .streaming
                .enabled()
                .into_iter()
                .map(Stream::name)
                .collect();
            format!("streaming=[{}]", streams.join(","))
        }
    }
}

fn on_off(value: bool) -> String {
    let text = if value { "on" } else { "off" };
    text.to_string()
}

fn status_rows(status: &Status) -> Vec<(&'static str, String)> {
    let mut rows = vec![
        ("magnetometer", on_off(status.magnetometer_enabled)),
        ("gyroscope", on_off(status.gyroscope_enabled)),
        ("accelerometer", on_off(status.accelerometer_enabled)),
        (
            "gyroscope_resolution",
            status
                .gyroscope_resolution
                .map_or_else(|| "unknown".to_string(), |r| r.to_string()),
        ),
        (
            "accelerometer_resolution",
            status
                .accelerometer_resolution
                .map_or_else(|| "unknown".to_string(), |r| r.to_string()),
        ),
        ("low_output_rate", on_off(status.low_output_rate)),
    ];
    for stream in Stream::ALL {
        let field = match stream {
            Stream::Heading => "stream.heading",
            Stream::Euler => "stream.euler",
            Stream::Magnetometer => "stream.magnetometer",
            Stream::Quaternions => "stream.quaternions",
            Stream::Gyroscope => "stream.gyroscope",
            Stream::Accelerometer => "stream.accelerometer",
        };
        rows.push((field, on_off(status.streaming.get(stream))));
    }
    rows
}
