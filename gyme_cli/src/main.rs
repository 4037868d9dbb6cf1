use chrono::{Local, Utc};
use clap::{Parser, Subcommand};
use gyme_core::meal_plan::sort_by_meal_type;
use gyme_core::tracker::{format_duration, format_pace, read_fixes};
use gyme_core::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "gyme")]
#[command(about = "Workouts, runs and meal plans from the terminal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Body profile and derived metabolic figures
    Profile {
        #[command(subcommand)]
        action: ProfileCommand,
    },

    /// Weekly workout checklist (default: today's workouts)
    Workout {
        #[command(subcommand)]
        action: WorkoutCommand,
    },

    /// GPS run tracking and history
    Run {
        #[command(subcommand)]
        action: RunCommand,
    },

    /// Daily meal plan
    Meal {
        #[command(subcommand)]
        action: MealCommand,
    },

    /// Body-weight history
    Weight {
        #[command(subcommand)]
        action: WeightCommand,
    },

    /// Export run and weight history as CSV
    Export {
        /// Directory to write runs.csv and weights.csv into
        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Subcommand)]
enum ProfileCommand {
    /// Complete onboarding
    Setup {
        /// Body weight in kg
        #[arg(long)]
        weight: String,
        /// Height in cm
        #[arg(long)]
        height: String,
        /// Age in years
        #[arg(long)]
        age: String,
        /// male or female
        #[arg(long, default_value = "male")]
        sex: Sex,
    },

    /// Show profile, BMI, BMR, TDEE, goal and calorie target
    Show,

    /// Change weight, height or age
    Edit {
        #[arg(long)]
        weight: Option<String>,
        #[arg(long)]
        height: Option<String>,
        #[arg(long)]
        age: Option<String>,
    },
}

#[derive(Subcommand)]
enum WorkoutCommand {
    /// Today's checklist
    Today,

    /// Checklist for a given day
    List {
        /// Day of week (mon..sun)
        #[arg(long)]
        day: DayOfWeek,
    },

    /// Add a custom exercise
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        muscle: String,
        #[arg(long, default_value = "3")]
        sets: String,
        #[arg(long, default_value = "12")]
        reps: String,
        /// Image or animation URL
        #[arg(long, default_value = "")]
        image: String,
        /// Day of week, defaults to today
        #[arg(long)]
        day: Option<DayOfWeek>,
    },

    /// Tick an exercise off
    Done {
        id: Uuid,
        /// Untick instead
        #[arg(long)]
        undo: bool,
    },

    /// Record the working weight for an exercise
    Weight { id: Uuid, kg: f64 },

    /// Untick every exercise
    Reset,

    /// Remove an exercise
    Delete { id: Uuid },
}

#[derive(Subcommand)]
enum RunCommand {
    /// Replay a JSONL file of GPS fixes as a run
    Track {
        /// One fix per line: {"lat":..,"lon":..,"accuracy_m":..,"at":"RFC3339"}
        #[arg(long)]
        fixes: PathBuf,
        /// Body weight for the calorie estimate, defaults to the profile weight
        #[arg(long)]
        weight: Option<f64>,
    },

    /// Run history, newest first
    List,

    /// One run including its path
    Show { id: Uuid },

    /// Remove a run
    Delete { id: Uuid },
}

#[derive(Subcommand)]
enum MealCommand {
    /// Generate a fresh plan for today, replacing today's meals
    Plan {
        /// Seed for a reproducible plan
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Today's meals against the calorie target
    List,

    /// Remove a meal
    Delete { id: Uuid },
}

#[derive(Subcommand)]
enum WeightCommand {
    /// Record a body-weight measurement and make it the profile weight
    Log { kg: f64 },

    /// Weight history, oldest first
    Trend,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.verbose {
        gyme_core::logging::init_with_level("debug");
    } else {
        gyme_core::logging::init();
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Command failed: {:?}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    tracing::debug!("Using data directory {:?}", data_dir);
    let store = Store::open(data_dir);

    match cli.command {
        Some(Commands::Profile { action }) => cmd_profile(&store, &config, action),
        Some(Commands::Workout { action }) => cmd_workout(&store, action),
        Some(Commands::Run { action }) => cmd_run(&store, &config, action),
        Some(Commands::Meal { action }) => cmd_meal(&store, &config, action),
        Some(Commands::Weight { action }) => cmd_weight(&store, &config, action),
        Some(Commands::Export { out }) => cmd_export(&store, &out),
        None => {
            // Default to today's checklist
            cmd_workout(&store, WorkoutCommand::Today)
        }
    }
}

// ============================================================================
// Profile
// ============================================================================

fn cmd_profile(store: &Store, config: &Config, action: ProfileCommand) -> Result<()> {
    match action {
        ProfileCommand::Setup {
            weight,
            height,
            age,
            sex,
        } => {
            let profile = UserProfile::from_fields(&weight, &height, &age, sex)?;
            store.onboard(profile)?;
            println!("✓ Profile saved");
            display_report(store, config)
        }
        ProfileCommand::Show => display_report(store, config),
        ProfileCommand::Edit {
            weight,
            height,
            age,
        } => {
            let current = store.load_profile(config)?;
            let weight = weight.unwrap_or_else(|| current.weight_kg.to_string());
            let height = height.unwrap_or_else(|| current.height_cm.to_string());
            let age = age.unwrap_or_else(|| current.age_years.to_string());
            let (weight_kg, height_cm, age_years) =
                metabolic::parse_profile_fields(&weight, &height, &age)?;

            let edit = ProfileEdit {
                weight_kg: Some(weight_kg),
                height_cm: Some(height_cm),
                age_years: Some(age_years),
            };
            store.edit_profile(&edit, config)?;
            println!("✓ Profile updated");
            display_report(store, config)
        }
    }
}

fn display_report(store: &Store, config: &Config) -> Result<()> {
    let profile = store.load_profile(config)?;
    let report = calculate(&profile, &config.metabolic);

    if !profile.setup_done {
        println!("Profile not set up yet, showing defaults (run `gyme profile setup`).");
    }

    println!();
    println!("  Weight:   {:.1} kg", profile.weight_kg);
    println!("  Height:   {:.0} cm", profile.height_cm);
    println!("  Age:      {}", profile.age_years);
    println!("  Sex:      {:?}", profile.sex);
    println!();
    println!("  BMI:      {:.1} ({})", report.bmi, report.bmi_category);
    println!("  BMR:      {:.0} kcal", report.bmr);
    println!("  TDEE:     {:.0} kcal", report.tdee);
    println!("  Goal:     {}", report.goal);
    println!("  Target:   {} kcal/day", report.calorie_target);
    Ok(())
}

// ============================================================================
// Workouts
// ============================================================================

fn cmd_workout(store: &Store, action: WorkoutCommand) -> Result<()> {
    store.seed_if_empty()?;

    match action {
        WorkoutCommand::Today => display_day(store, DayOfWeek::today()),
        WorkoutCommand::List { day } => display_day(store, day),
        WorkoutCommand::Add {
            name,
            muscle,
            sets,
            reps,
            image,
            day,
        } => {
            let new = NewWorkout {
                exercise_name: name,
                muscle_group: muscle,
                sets,
                reps,
                image_url: image,
            };
            let day = day.unwrap_or_else(DayOfWeek::today);
            let workout = store.add_custom_workout(&new, day)?;
            println!("✓ Added {} on {}", workout.exercise_name, day);
            println!("  id: {}", workout.id);
            Ok(())
        }
        WorkoutCommand::Done { id, undo } => {
            let workout = store.set_completed(id, !undo)?;
            let mark = if workout.completed { "done" } else { "not done" };
            println!("✓ {} marked {}", workout.exercise_name, mark);
            Ok(())
        }
        WorkoutCommand::Weight { id, kg } => {
            let workout = store.update_weight(id, kg)?;
            println!("✓ {} now at {:.1} kg", workout.exercise_name, workout.weight_kg);
            Ok(())
        }
        WorkoutCommand::Reset => {
            let count = store.reset_checklist()?;
            println!("✓ Reset {} exercises", count);
            Ok(())
        }
        WorkoutCommand::Delete { id } => {
            store.delete_workout(id)?;
            println!("✓ Workout deleted");
            Ok(())
        }
    }
}

fn display_day(store: &Store, day: DayOfWeek) -> Result<()> {
    let workouts = store.workouts_for_day(day)?;

    println!("{} workouts", day);
    if workouts.is_empty() {
        println!("  Rest day - nothing scheduled.");
        return Ok(());
    }

    let done = workouts.iter().filter(|w| w.completed).count();
    for w in &workouts {
        let mark = if w.completed { "x" } else { " " };
        println!(
            "  [{}] {} ({}) - {} x {}",
            mark, w.exercise_name, w.muscle_group, w.sets, w.reps
        );
        if w.weight_kg > 0.0 {
            println!("      weight: {:.1} kg", w.weight_kg);
        }
        println!("      id: {}", w.id);
    }
    println!("  {}/{} done", done, workouts.len());
    Ok(())
}

// ============================================================================
// Runs
// ============================================================================

fn cmd_run(store: &Store, config: &Config, action: RunCommand) -> Result<()> {
    match action {
        RunCommand::Track { fixes, weight } => track_run(store, config, &fixes, weight),
        RunCommand::List => {
            let runs = store.list_runs()?;
            if runs.is_empty() {
                println!("No runs recorded yet.");
                return Ok(());
            }
            for run in &runs {
                println!(
                    "{}  {:.2} km  {}  {} kcal  {}",
                    run.recorded_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
                    run.distance_km,
                    format_duration(run.duration_ms),
                    run.calories_burned,
                    run.avg_pace
                );
                println!("  id: {}", run.id);
            }
            Ok(())
        }
        RunCommand::Show { id } => {
            let run = store.get_run(id)?;
            display_run(&run);
            println!("  Path ({} points):", run.path.len());
            for point in &run.path {
                println!("    {:.6}, {:.6}", point.lat, point.lon);
            }
            Ok(())
        }
        RunCommand::Delete { id } => {
            store.delete_run(id)?;
            println!("✓ Run deleted");
            Ok(())
        }
    }
}

fn track_run(store: &Store, config: &Config, fixes: &Path, weight: Option<f64>) -> Result<()> {
    // The fixes file stands in for the location provider
    let permission = if fixes.is_file() {
        LocationPermission::Granted
    } else {
        LocationPermission::Denied
    };

    let weight_kg = match weight {
        Some(kg) => kg,
        None => store.load_profile(config)?.weight_kg,
    };

    let fixes = if permission == LocationPermission::Granted {
        read_fixes(fixes)?
    } else {
        Vec::new()
    };
    let started_at = fixes.first().map(|f| f.at).unwrap_or_else(Utc::now);

    let mut accumulator = RunAccumulator::start(permission, weight_kg, started_at, &config.tracking)?;

    for fix in &fixes {
        if let FixOutcome::Moved(_) = accumulator.push(fix) {
            let snap = accumulator.snapshot(fix.at);
            let pace = snap
                .pace_min_per_km
                .map(format_pace)
                .unwrap_or_else(|| "-:-- /km".into());
            println!(
                "  {}  {:.2} km  {} kcal  {}",
                format_duration(snap.elapsed.num_milliseconds()),
                snap.distance_km,
                snap.calories,
                pace
            );
        }
    }

    let ended_at = fixes.last().map(|f| f.at).unwrap_or(started_at);
    match accumulator.finish(ended_at) {
        Some(run) => {
            store.save_run(&run)?;
            println!("✓ Run saved");
            display_run(&run);
        }
        None => {
            println!("Run too short, not saved.");
        }
    }
    Ok(())
}

fn display_run(run: &RunHistory) {
    println!();
    println!(
        "  {}",
        run.recorded_at.with_timezone(&Local).format("%A %Y-%m-%d %H:%M")
    );
    println!("  Distance: {:.2} km", run.distance_km);
    println!("  Duration: {}", format_duration(run.duration_ms));
    println!("  Pace:     {}", run.avg_pace);
    println!("  Calories: {} kcal", run.calories_burned);
    println!("  id: {}", run.id);
}

// ============================================================================
// Meals
// ============================================================================

fn cmd_meal(store: &Store, config: &Config, action: MealCommand) -> Result<()> {
    let report = store.metabolic_report(config)?;
    let today = Local::now().date_naive();

    match action {
        MealCommand::Plan { seed } => {
            let now = Utc::now();
            let mut plan = match seed {
                Some(seed) => {
                    let mut rng = StdRng::seed_from_u64(seed);
                    generate_meal_plan(report.calorie_target, report.goal, now, &mut rng, &config.meals)
                }
                None => generate_meal_plan(
                    report.calorie_target,
                    report.goal,
                    now,
                    &mut rand::thread_rng(),
                    &config.meals,
                ),
            };
            sort_by_meal_type(&mut plan);
            store.regenerate_day(today, &plan)?;

            println!("✓ New {} plan for {}", report.goal, today);
            display_meals(&plan, report.calorie_target);
            Ok(())
        }
        MealCommand::List => {
            let meals = store.meals_for_day(today)?;
            if meals.is_empty() {
                println!("No meals for today (run `gyme meal plan`).");
                return Ok(());
            }
            display_meals(&meals, report.calorie_target);
            Ok(())
        }
        MealCommand::Delete { id } => {
            store.delete_meal(id)?;
            println!("✓ Meal deleted");
            Ok(())
        }
    }
}

fn display_meals(meals: &[Meal], target: i32) {
    println!();
    for meal in meals {
        println!(
            "  {:<10} {}  ({} kcal, {} g protein)",
            meal.meal_type.to_string(),
            meal.name,
            meal.calories,
            meal.protein_g
        );
        println!("             id: {}", meal.id);
    }

    let intake = DailyIntake::from_meals(target, meals);
    println!();
    println!("  Target:    {} kcal", intake.target);
    println!("  Planned:   {} kcal, {} g protein", intake.eaten, intake.protein_g);
    if intake.is_over() {
        println!("  Over by:   {} kcal", -intake.remaining);
    } else {
        println!("  Remaining: {} kcal", intake.remaining);
    }
}

// ============================================================================
// Weight
// ============================================================================

fn cmd_weight(store: &Store, config: &Config, action: WeightCommand) -> Result<()> {
    match action {
        WeightCommand::Log { kg } => {
            store.log_weight(kg, Utc::now(), config)?;
            println!("✓ Logged {:.1} kg", kg);
            Ok(())
        }
        WeightCommand::Trend => {
            let trend = store.weight_trend()?;
            if trend.is_empty() {
                println!("No weight entries yet.");
                return Ok(());
            }

            let mut previous: Option<f64> = None;
            for entry in &trend {
                let delta = previous
                    .map(|p| format!("{:+.1}", entry.weight_kg - p))
                    .unwrap_or_default();
                println!(
                    "  {}  {:.1} kg  {}",
                    entry.recorded_at.with_timezone(&Local).format("%Y-%m-%d"),
                    entry.weight_kg,
                    delta
                );
                previous = Some(entry.weight_kg);
            }
            Ok(())
        }
    }
}

// ============================================================================
// Export
// ============================================================================

fn cmd_export(store: &Store, out: &Path) -> Result<()> {
    let runs_path = out.join("runs.csv");
    let weights_path = out.join("weights.csv");

    let runs = export_runs_csv(&store.list_runs()?, &runs_path)?;
    let weights = export_weights_csv(&store.weight_trend()?, &weights_path)?;

    println!("✓ Exported {} runs to {}", runs, runs_path.display());
    println!("✓ Exported {} weight entries to {}", weights, weights_path.display());
    Ok(())
}
