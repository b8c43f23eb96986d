use std::fs::File;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use school_records::config::AppConfig;
use school_records::models::*;
use school_records::store::{open_store, StoreFormat};
use school_records::{export, render, search, School};

#[derive(Parser)]
#[command(name = "school")]
#[command(about = "Manage students, instructors and courses")]
struct Cli {
    /// Data file (overrides SCHOOL_DATA_FILE and the config file)
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Storage format: json or sqlite. Inferred from the file extension if omitted.
    #[arg(long, global = true, value_parser = parse_format)]
    format: Option<StoreFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add, edit, remove or list students
    Student {
        #[command(subcommand)]
        action: PersonAction,
    },
    /// Add, edit, remove or list instructors
    Instructor {
        #[command(subcommand)]
        action: PersonAction,
    },
    /// Add, edit, remove or list courses
    Course {
        #[command(subcommand)]
        action: CourseAction,
    },
    /// Register a student in a course
    Enroll { student_id: String, course_id: String },
    /// Remove a student from a course
    Drop { student_id: String, course_id: String },
    /// Make an instructor the instructor of a course
    Assign {
        instructor_id: String,
        course_id: String,
    },
    /// Clear the instructor of a course
    Unassign { course_id: String },
    /// Search ids and names of all records (case-insensitive)
    Search { term: String },
    /// List every record
    List,
    /// Export every record as CSV
    ExportCsv {
        /// Output file. Writes to stdout when omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print a student's or instructor's introduction
    Introduce { id: String },
    /// Show the stored configuration, updating any field given
    Config {
        /// Data file used when neither --data nor SCHOOL_DATA_FILE is set
        #[arg(long)]
        data_file: Option<PathBuf>,

        /// Storage format saved in the config: json or sqlite
        #[arg(long, value_parser = parse_format)]
        store_format: Option<StoreFormat>,
    },
}

#[derive(Subcommand)]
enum PersonAction {
    Add {
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        age: String,
        #[arg(long)]
        email: String,
    },
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        age: Option<String>,
        #[arg(long)]
        email: Option<String>,
        /// Rename the record; links are rewritten to the new id
        #[arg(long)]
        new_id: Option<String>,
    },
    Remove {
        id: String,
    },
    List,
    Show {
        id: String,
    },
}

#[derive(Subcommand)]
enum CourseAction {
    Add {
        id: String,
        #[arg(long)]
        name: String,
    },
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        new_id: Option<String>,
    },
    Remove {
        id: String,
    },
    List,
    /// Print the course roster
    Show {
        id: String,
    },
}

fn parse_format(s: &str) -> Result<StoreFormat, String> {
    StoreFormat::from_str(s).ok_or_else(|| format!("unknown format '{}', expected json or sqlite", s))
}

/// Initialize tracing on stderr so stdout carries only listings and CSV.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "school_records=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = AppConfig::load();
    let command = match cli.command {
        Commands::Config {
            data_file,
            store_format,
        } => return configure(config, data_file, store_format),
        command => command,
    };

    let path = config.resolve_data_file(cli.data)?;
    let store = open_store(path, cli.format.or(config.format));

    let mut school = store
        .load()
        .with_context(|| format!("Failed to load {}", store.path().display()))?;

    if let Some(message) = execute(command, &mut school)? {
        store
            .save(&school)
            .with_context(|| format!("Failed to save {}", store.path().display()))?;
        println!("{}", message);
        print!("{}", render::table(&render::records(&school)));
    }

    Ok(())
}

fn configure(
    mut config: AppConfig,
    data_file: Option<PathBuf>,
    store_format: Option<StoreFormat>,
) -> Result<()> {
    let changed = data_file.is_some() || store_format.is_some();
    if let Some(path) = data_file {
        config.data_file = Some(path);
    }
    if let Some(format) = store_format {
        config.format = Some(format);
    }

    if changed {
        let path = config.save()?;
        println!("Saved {}", path.display());
    }
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

/// Run one command. Returns a message when the state changed and must be saved.
fn execute(command: Commands, school: &mut School) -> Result<Option<String>> {
    let message = match command {
        Commands::Student { action } => return student(action, school),
        Commands::Instructor { action } => return instructor(action, school),
        Commands::Course { action } => return course(action, school),
        Commands::Enroll {
            student_id,
            course_id,
        } => {
            if !school.register_student_in_course(&student_id, &course_id)? {
                println!("{} is already registered in {}", student_id, course_id);
                return Ok(None);
            }
            format!("Registered {} in {}", student_id, course_id)
        }
        Commands::Drop {
            student_id,
            course_id,
        } => {
            if !school.unregister_student_from_course(&student_id, &course_id)? {
                println!("{} is not registered in {}", student_id, course_id);
                return Ok(None);
            }
            format!("Removed {} from {}", student_id, course_id)
        }
        Commands::Assign {
            instructor_id,
            course_id,
        } => {
            if !school.assign_instructor_to_course(&instructor_id, &course_id)? {
                println!("{} already teaches {}", instructor_id, course_id);
                return Ok(None);
            }
            format!("Assigned {} to {}", instructor_id, course_id)
        }
        Commands::Unassign { course_id } => match school.unassign_instructor(&course_id)? {
            Some(previous) => format!("Unassigned {} from {}", previous, course_id),
            None => {
                println!("{} has no instructor", course_id);
                return Ok(None);
            }
        },
        Commands::Search { term } => {
            let results = search::all(school, &term);
            if results.is_empty() {
                println!("No records match '{}'", term);
            } else {
                print!("{}", render::table(&render::search_records(school, &results)));
            }
            return Ok(None);
        }
        Commands::List => {
            print!("{}", render::table(&render::records(school)));
            return Ok(None);
        }
        Commands::ExportCsv { output } => {
            let rows = match &output {
                Some(path) => {
                    let file = File::create(path)
                        .with_context(|| format!("Failed to create {}", path.display()))?;
                    export::write_csv(school, file)?
                }
                None => export::write_csv(school, std::io::stdout().lock())?,
            };
            if let Some(path) = output {
                println!("Exported {} records to {}", rows, path.display());
            }
            return Ok(None);
        }
        Commands::Config { .. } => bail!("config does not operate on the data file"),
        Commands::Introduce { id } => {
            let person = match school.kind_of(&id) {
                Some(EntityKind::Student) => school.student(&id).map(|s| s.person()),
                Some(EntityKind::Instructor) => school.instructor(&id).map(|i| i.person()),
                Some(EntityKind::Course) => {
                    bail!("'{}' is a course; only people can introduce themselves", id)
                }
                None => None,
            };
            let person = person.with_context(|| format!("No record with id '{}'", id))?;
            println!("{}", person.introduce());
            return Ok(None);
        }
    };

    Ok(Some(message))
}

fn student(action: PersonAction, school: &mut School) -> Result<Option<String>> {
    let message = match action {
        PersonAction::Add {
            id,
            name,
            age,
            email,
        } => {
            let student = school.create_student(CreateStudentInput {
                name,
                age: parse_age(&age)?,
                email,
                student_id: id,
            })?;
            format!("Added student {}", student.id())
        }
        PersonAction::Edit {
            id,
            name,
            age,
            email,
            new_id,
        } => {
            let age = age.as_deref().map(parse_age).transpose()?;
            let student = school.update_student(
                &id,
                UpdateStudentInput {
                    name,
                    age,
                    email,
                    student_id: new_id,
                },
            )?;
            format!("Updated student {}", student.id())
        }
        PersonAction::Remove { id } => {
            school.remove_entity(EntityKind::Student, &id)?;
            format!("Removed student {}", id)
        }
        PersonAction::List => {
            let rows: Vec<_> = school
                .students()
                .iter()
                .map(|s| render::student_record(school, s))
                .collect();
            print!("{}", render::table(&rows));
            return Ok(None);
        }
        PersonAction::Show { id } => {
            let student = school
                .student(&id)
                .with_context(|| format!("Student '{}' not found", id))?;
            println!("Student ID: {}", student.id());
            println!("Name: {}", student.name());
            println!("Age: {}", student.age());
            println!("Email: {}", student.email());
            println!("Courses: {}", render::student_record(school, student).details);
            return Ok(None);
        }
    };

    Ok(Some(message))
}

fn instructor(action: PersonAction, school: &mut School) -> Result<Option<String>> {
    let message = match action {
        PersonAction::Add {
            id,
            name,
            age,
            email,
        } => {
            let instructor = school.create_instructor(CreateInstructorInput {
                name,
                age: parse_age(&age)?,
                email,
                instructor_id: id,
            })?;
            format!("Added instructor {}", instructor.id())
        }
        PersonAction::Edit {
            id,
            name,
            age,
            email,
            new_id,
        } => {
            let age = age.as_deref().map(parse_age).transpose()?;
            let instructor = school.update_instructor(
                &id,
                UpdateInstructorInput {
                    name,
                    age,
                    email,
                    instructor_id: new_id,
                },
            )?;
            format!("Updated instructor {}", instructor.id())
        }
        PersonAction::Remove { id } => {
            school.remove_entity(EntityKind::Instructor, &id)?;
            format!("Removed instructor {}", id)
        }
        PersonAction::List => {
            let rows: Vec<_> = school
                .instructors()
                .iter()
                .map(|i| render::instructor_record(school, i))
                .collect();
            print!("{}", render::table(&rows));
            return Ok(None);
        }
        PersonAction::Show { id } => {
            let instructor = school
                .instructor(&id)
                .with_context(|| format!("Instructor '{}' not found", id))?;
            println!("Instructor ID: {}", instructor.id());
            println!("Name: {}", instructor.name());
            println!("Age: {}", instructor.age());
            println!("Email: {}", instructor.email());
            println!(
                "Courses: {}",
                render::instructor_record(school, instructor).details
            );
            return Ok(None);
        }
    };

    Ok(Some(message))
}

fn course(action: CourseAction, school: &mut School) -> Result<Option<String>> {
    let message = match action {
        CourseAction::Add { id, name } => {
            let course = school.create_course(CreateCourseInput {
                course_id: id,
                course_name: name,
            })?;
            format!("Added course {}", course.id())
        }
        CourseAction::Edit { id, name, new_id } => {
            let course = school.update_course(
                &id,
                UpdateCourseInput {
                    course_id: new_id,
                    course_name: name,
                },
            )?;
            format!("Updated course {}", course.id())
        }
        CourseAction::Remove { id } => {
            school.remove_entity(EntityKind::Course, &id)?;
            format!("Removed course {}", id)
        }
        CourseAction::List => {
            let rows: Vec<_> = school
                .courses()
                .iter()
                .map(|c| render::course_record(school, c))
                .collect();
            print!("{}", render::table(&rows));
            return Ok(None);
        }
        CourseAction::Show { id } => {
            let course = school
                .course(&id)
                .with_context(|| format!("Course '{}' not found", id))?;
            print!("{}", render::roster(school, course));
            return Ok(None);
        }
    };

    Ok(Some(message))
}
