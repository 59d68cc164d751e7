//! `guruwali` - CLI for the homeroom counseling journal
//!
//! This binary manages the student roster and counseling logs stored in the
//! local database and exports them as Word documents.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;

use guruwali::cli::{
    BackupCommand, Cli, Command, ConfigCommand, LogArgs, LogCommand, OutputFormat, StatsCommand,
    StudentCommand,
};
use guruwali::{
    counseling_report, filter_logs, init_logging, student_report, Config, CounselingLog,
    DashboardStats, Journal, JournalSnapshot, LogId, NewCounselingLog, NewStudent, Storage,
    Student, StudentId, TypeFilter,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;
    let today = Local::now().date_naive();

    match cli.command {
        Command::Student(cmd) => handle_student(&config, cmd, today),
        Command::Log(cmd) => handle_log(&config, cmd, today),
        Command::Stats(cmd) => handle_stats(&config, &cmd, today),
        Command::Backup(cmd) => handle_backup(&config, cmd),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn open_storage(config: &Config) -> Result<(Storage, Journal)> {
    let path = config.database_path();
    let storage =
        Storage::open(&path).with_context(|| format!("opening database {}", path.display()))?;
    let journal = storage.load_journal().context("loading journal")?;
    Ok((storage, journal))
}

fn output_dir(config: &Config, requested: Option<PathBuf>) -> PathBuf {
    requested.unwrap_or_else(|| config.output_dir())
}

fn handle_student(config: &Config, cmd: StudentCommand, today: NaiveDate) -> Result<()> {
    let (storage, mut journal) = open_storage(config)?;

    match cmd {
        StudentCommand::Add(args) => {
            let student = journal.add_student(NewStudent::from(args)).clone();
            storage.insert_student(&student)?;
            println!("Added student {} ({})", student.name, student.id);
        }
        StudentCommand::List { format } => print_students(journal.students(), format)?,
        StudentCommand::Show { id, json } => {
            let id = StudentId::from(id);
            let student = journal.require_student(&id)?;
            let logs: Vec<&CounselingLog> = journal.logs_for(&id).collect();
            if json {
                let value = serde_json::json!({ "student": student, "logs": logs });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                print_student_detail(student, &logs);
            }
        }
        StudentCommand::Edit { id, fields } => {
            let id = StudentId::from(id);
            let current = journal.require_student(&id)?;
            let merged = fields.apply(NewStudent::from(current));
            let updated = journal.update_student(&id, merged)?.clone();
            storage.update_student(&updated)?;
            println!("Updated student {} ({})", updated.name, updated.id);
        }
        StudentCommand::Delete { id } => {
            let id = StudentId::from(id);
            let removed = journal.delete_student(&id)?;
            storage.delete_student(&id)?;
            let kept = journal.logs_for(&id).count();
            println!("Deleted student {} ({kept} counseling logs kept)", removed.name);
        }
        StudentCommand::Export { output_dir: dir } => {
            let document = student_report(journal.students(), config, today);
            let path = document.save_in(&output_dir(config, dir))?;
            println!("Saved {} ({} students)", path.display(), document.rows);
        }
    }
    Ok(())
}

fn handle_log(config: &Config, cmd: LogCommand, today: NaiveDate) -> Result<()> {
    let (storage, mut journal) = open_storage(config)?;

    match cmd {
        LogCommand::Add(args) => {
            let entry = new_log(args, config, today);
            let log = journal.add_log(entry)?.clone();
            storage.insert_log(&log)?;
            println!(
                "Recorded {} session for {} ({})",
                log.counseling_type, log.student.student_name, log.id
            );
        }
        LogCommand::List { filter, format } => {
            let selected = filter_logs(journal.logs(), TypeFilter::from(filter));
            print_logs(&selected, format)?;
        }
        LogCommand::Show { id, json } => {
            let id = LogId::from(id);
            let log = journal.require_log(&id)?;
            if json {
                println!("{}", serde_json::to_string_pretty(log)?);
            } else {
                print_log_detail(log);
            }
        }
        LogCommand::Export {
            filter,
            output_dir: dir,
        } => {
            let filter = TypeFilter::from(filter);
            let selected = filter_logs(journal.logs(), filter);
            let document = counseling_report(selected.iter().copied(), filter, config, today);
            let path = document.save_in(&output_dir(config, dir))?;
            println!("Saved {} ({} logs)", path.display(), document.rows);
        }
    }
    Ok(())
}

fn new_log(args: LogArgs, config: &Config, today: NaiveDate) -> NewCounselingLog {
    let academic_year = args
        .academic_year
        .unwrap_or_else(|| config.academic_year.clone());
    let mut entry = NewCounselingLog::new(
        StudentId::from(args.student_id),
        args.date.unwrap_or(today),
        academic_year,
    );
    entry.start_time = args.start;
    entry.end_time = args.end;
    entry.counseling_type = args.counseling_type.into();
    entry.aspect = args.aspect.into();
    entry.result = args.result;
    entry.status = args.status.into();
    entry.follow_up = args.follow_up;
    entry.notes = args.notes;
    entry
}

fn handle_stats(config: &Config, cmd: &StatsCommand, today: NaiveDate) -> Result<()> {
    let (storage, journal) = open_storage(config)?;
    let stats = DashboardStats::derive(journal.logs(), &config.academic_year, today);
    let counts = storage.counts().context("counting stored records")?;

    if cmd.json {
        let value = serde_json::json!({
            "dashboard": stats,
            "storage": {
                "database_path": storage.path(),
                "students": counts.students,
                "logs": counts.logs,
                "db_size_bytes": counts.db_size_bytes,
            }
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("Tahun Ajaran {}", stats.academic_year);
        println!("---------------------");
        println!("Total Bimbingan:  {}", stats.total);
        println!("Butuh Bantuan:    {}", stats.needs_help);
        println!("Hari Ini:         {}", stats.today);
        println!("Individual:       {}", stats.individual);
        println!("Klasikal:         {}", stats.klasikal);
        println!();
        println!("Database:         {}", storage.path().display());
        println!("Siswa tersimpan:  {}", counts.students);
        println!("Jurnal tersimpan: {}", counts.logs);
        println!("Ukuran:           {} bytes", counts.db_size_bytes);
    }
    Ok(())
}

fn handle_backup(config: &Config, cmd: BackupCommand) -> Result<()> {
    let (mut storage, journal) = open_storage(config)?;

    match cmd {
        BackupCommand::Export { file } => {
            let json = serde_json::to_string_pretty(&journal.snapshot())?;
            std::fs::write(&file, json)
                .with_context(|| format!("writing backup {}", file.display()))?;
            println!(
                "Exported {} students and {} logs to {}",
                journal.students().len(),
                journal.logs().len(),
                file.display()
            );
        }
        BackupCommand::Import { file, replace } => {
            let snapshot = read_backup(&file)?;
            let journal = if replace {
                let restored = Journal::from_snapshot(snapshot)?;
                println!(
                    "Restored {} students and {} logs",
                    restored.students().len(),
                    restored.logs().len()
                );
                restored
            } else {
                let mut merged = journal;
                let (students, logs) = merged.merge(snapshot);
                println!("Merged {students} new students and {logs} new logs");
                merged
            };
            storage.save_journal(&journal)?;
        }
    }
    Ok(())
}

fn read_backup(path: &Path) -> Result<JournalSnapshot> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading backup {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing backup {}", path.display()))
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Teacher]");
                println!("  Name:               {}", config.teacher.name);
                println!("  School:             {}", config.teacher.school);
                println!("  NIP:                {}", config.teacher.nip);
                println!("  Academic year:      {}", config.academic_year);
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!();
                println!("[Report]");
                println!("  Output directory:   {}", config.output_dir().display());
                println!("  Date format:        {}", config.report.date_format);
                println!("  Escape text:        {}", config.report.escape_text);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}

fn print_students(students: &[Student], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(students)?),
        OutputFormat::Plain => {
            for student in students {
                println!("{}\t{}\t{}", student.id, student.name, student.class_name);
            }
        }
        OutputFormat::Table => {
            println!("{:<4} {:<36} {:<24} {:<10} {:<14}", "No", "ID", "Nama Siswa", "Kelas", "No. HP");
            for (i, student) in students.iter().enumerate() {
                println!(
                    "{:<4} {:<36} {:<24} {:<10} {:<14}",
                    i + 1,
                    student.id,
                    student.name,
                    student.class_name,
                    student.phone
                );
            }
            println!("{} students", students.len());
        }
    }
    Ok(())
}

fn print_logs(logs: &[&CounselingLog], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(logs)?),
        OutputFormat::Plain => {
            for log in logs {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    log.id, log.date, log.student.student_name, log.counseling_type, log.status
                );
            }
        }
        OutputFormat::Table => {
            println!(
                "{:<4} {:<10} {:<24} {:<8} {:<10} {:<16} {:<15}",
                "No", "Tanggal", "Nama Siswa", "Kelas", "Jenis", "Aspek", "Status"
            );
            for (i, log) in logs.iter().enumerate() {
                println!(
                    "{:<4} {:<10} {:<24} {:<8} {:<10} {:<16} {:<15}",
                    i + 1,
                    log.date,
                    log.student.student_name,
                    log.student.class_name,
                    log.counseling_type,
                    log.aspect,
                    log.status
                );
            }
            println!("{} logs", logs.len());
        }
    }
    Ok(())
}

fn print_student_detail(student: &Student, logs: &[&CounselingLog]) {
    println!("ID:       {}", student.id);
    println!("Nama:     {}", student.name);
    println!("Kelas:    {}", student.class_name);
    println!("Alamat:   {}", student.address);
    println!("No. HP:   {}", student.phone);
    if !student.notes.is_empty() {
        println!("Catatan:  {}", student.notes);
    }
    println!();
    println!("Riwayat bimbingan ({}):", logs.len());
    for log in logs {
        println!(
            "  {} {} [{}] {} - {}",
            log.date, log.counseling_type, log.aspect, log.status, log.result
        );
    }
}

fn print_log_detail(log: &CounselingLog) {
    println!("ID:             {}", log.id);
    println!("Tanggal:        {} ({})", log.date, log.time_span());
    println!("Tahun Ajaran:   {}", log.academic_year);
    println!(
        "Siswa:          {} ({}), id {}",
        log.student.student_name, log.student.class_name, log.student_id
    );
    println!("Jenis:          {}", log.counseling_type);
    println!("Aspek:          {}", log.aspect);
    println!("Status:         {}", log.status);
    println!("Hasil:          {}", log.result);
    println!("Tindak Lanjut:  {}", log.follow_up);
    if !log.notes.is_empty() {
        println!("Catatan:        {}", log.notes);
    }
}
