use std::io::{self, Write};

use serde::Serialize;

use crate::app::{CheckResult, DeleteResult, ListResult};
use crate::reconcile::SaveReport;
use crate::uploader::UploadReport;

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Interactive,
    NonInteractive,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

pub struct TextOutput;

impl TextOutput {
    pub fn print_list(result: &ListResult) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        if !result.loaded {
            writeln!(stdout, "could not load datasources from the server (see log)")?;
            return Ok(());
        }
        writeln!(stdout, "{} datasource(s)", result.datasources.len())?;
        for entry in &result.datasources {
            writeln!(
                stdout,
                "{:<16} {:<10} {:<9} {}",
                entry.identifier,
                entry.data_type,
                entry.availability,
                entry.name.join(", ")
            )?;
            if let Some(description) = &entry.description {
                writeln!(stdout, "    {description}")?;
            }
            if let Some(citation) = &entry.citation {
                writeln!(stdout, "    {citation}")?;
            }
        }
        Ok(())
    }

    pub fn print_check(result: &CheckResult) -> io::Result<()> {
        let verdict = match (result.loaded, result.valid) {
            (false, _) => "unknown (could not load datasources)",
            (true, true) => "valid",
            (true, false) => "invalid",
        };
        println!("{}: {verdict}", result.identifier);
        Ok(())
    }

    pub fn print_save(report: &SaveReport) -> io::Result<()> {
        match (report.decision, report.delivered) {
            (None, _) => println!("{}: not saved, server list unavailable", report.identifier),
            (Some(decision), true) => println!("{}: {decision} sent", report.identifier),
            (Some(decision), false) => {
                println!("{}: {decision} failed (see log)", report.identifier)
            }
        }
        Ok(())
    }

    pub fn print_delete(result: &DeleteResult) -> io::Result<()> {
        println!(
            "{}: removed ({} remaining)",
            result.identifier, result.remaining
        );
        Ok(())
    }

    pub fn print_upload(report: &UploadReport) -> io::Result<()> {
        if report.uploaded {
            println!("File uploaded! ({} -> {})", report.file, report.identifier);
        } else {
            println!("{}: upload of {} failed (see log)", report.identifier, report.file);
        }
        Ok(())
    }
}
