//! Default weekly training program.
//!
//! This module provides the built-in push/pull/legs split that is seeded
//! into an empty workout table.

use crate::types::{DayOfWeek, Workout};
use once_cell::sync::Lazy;
use uuid::Uuid;

/// One exercise of the built-in program, before it gets a record id
#[derive(Clone, Debug)]
pub struct ProgramEntry {
    pub day: DayOfWeek,
    pub exercise_name: String,
    pub muscle_group: String,
    pub sets: String,
    pub reps: String,
    pub instructions: String,
    pub image_url: String,
}

/// Image used for custom workouts added without one
pub const DEFAULT_IMAGE_URL: &str = "https://media.giphy.com/media/l0HlOaQcLJ2hHpYdy/giphy.gif";

/// Cached default program - built once and reused
static DEFAULT_PROGRAM: Lazy<Vec<ProgramEntry>> = Lazy::new(build_default_program);

/// Get a reference to the cached default program
pub fn default_program() -> &'static [ProgramEntry] {
    &DEFAULT_PROGRAM
}

fn entry(
    day: DayOfWeek,
    exercise_name: &str,
    muscle_group: &str,
    sets: &str,
    reps: &str,
    instructions: &str,
    image_url: &str,
) -> ProgramEntry {
    ProgramEntry {
        day,
        exercise_name: exercise_name.into(),
        muscle_group: muscle_group.into(),
        sets: sets.into(),
        reps: reps.into(),
        instructions: instructions.into(),
        image_url: image_url.into(),
    }
}

fn build_default_program() -> Vec<ProgramEntry> {
    use DayOfWeek::*;

    vec![
        // Monday: push
        entry(
            Monday,
            "Bench Press",
            "Chest",
            "4 Sets",
            "8-12 Reps",
            "Lower the bar slowly to mid-chest, then press up explosively. Keep your back flat on the bench.",
            "https://media.giphy.com/media/l41Yy4J96X8ehz8xG/giphy.gif",
        ),
        entry(
            Monday,
            "Overhead Press",
            "Shoulder",
            "3 Sets",
            "10 Reps",
            "Stand tall and press the barbell from the front of the shoulders straight overhead. Do not arch your back.",
            "https://i.makeagif.com/media/11-12-2015/F2x3_m.gif",
        ),
        entry(
            Monday,
            "Incline Dumbbell Press",
            "Chest",
            "3 Sets",
            "10-12 Reps",
            "Sit on a 30-45 degree incline bench and press the dumbbells up. Focus on the upper chest.",
            "https://fitnessprogramer.com/wp-content/uploads/2021/02/Incline-Dumbbell-Press.gif",
        ),
        entry(
            Monday,
            "Tricep Pushdown",
            "Tricep",
            "3 Sets",
            "15 Reps",
            "Use the cable and lock your elbows at your sides. Push down until the arms are straight.",
            "https://fitnessprogramer.com/wp-content/uploads/2021/02/Pushdown.gif",
        ),
        // Tuesday: pull
        entry(
            Tuesday,
            "Lat Pulldown",
            "Back",
            "4 Sets",
            "12 Reps",
            "Sit upright and pull the bar to the upper chest. Think of driving the elbows back.",
            "https://fitnessprogramer.com/wp-content/uploads/2021/02/Lat-Pulldown.gif",
        ),
        entry(
            Tuesday,
            "Barbell Row",
            "Back",
            "3 Sets",
            "10 Reps",
            "Hinge to 45 degrees and row the bar towards your stomach. Squeeze the back muscles.",
            "https://fitnessprogramer.com/wp-content/uploads/2021/02/Barbell-Bent-Over-Row.gif",
        ),
        entry(
            Tuesday,
            "Face Pull",
            "Rear Delt",
            "3 Sets",
            "15 Reps",
            "Pull the rope towards your face with the elbows held high.",
            "https://fitnessprogramer.com/wp-content/uploads/2021/02/Face-Pull.gif",
        ),
        entry(
            Tuesday,
            "Bicep Curl",
            "Bicep",
            "3 Sets",
            "12 Reps",
            "Curl the dumbbells by bending the elbows. Do not swing your body.",
            "https://fitnessprogramer.com/wp-content/uploads/2021/02/Dumbbell-Curl.gif",
        ),
        // Wednesday: legs
        entry(
            Wednesday,
            "Barbell Squat",
            "Legs",
            "4 Sets",
            "8-10 Reps",
            "Rest the bar on your upper back and squat until the thighs are parallel to the floor. Drive up through the heels.",
            "https://fitnessprogramer.com/wp-content/uploads/2021/02/Barbell-Squat.gif",
        ),
        entry(
            Wednesday,
            "Leg Press",
            "Legs",
            "3 Sets",
            "12 Reps",
            "Press the sled with your legs but do not lock the knees at the top.",
            "https://fitnessprogramer.com/wp-content/uploads/2021/02/Leg-Press.gif",
        ),
        entry(
            Wednesday,
            "Lunges",
            "Legs",
            "3 Sets",
            "12 Reps",
            "Take a long step forward and lower the hips until both knees reach 90 degrees.",
            "https://fitnessprogramer.com/wp-content/uploads/2021/02/Dumbbell-Lunge.gif",
        ),
        entry(
            Wednesday,
            "Calf Raise",
            "Calf",
            "4 Sets",
            "20 Reps",
            "Rise onto your toes as high as possible, hold briefly, then lower slowly.",
            "https://fitnessprogramer.com/wp-content/uploads/2021/02/Dumbbell-Calf-Raise.gif",
        ),
        // Thursday: shoulders
        entry(
            Thursday,
            "Dumbbell Shoulder Press",
            "Shoulder",
            "3 Sets",
            "12 Reps",
            "Sit upright and press the dumbbells overhead until the arms are almost straight.",
            "https://fitnessprogramer.com/wp-content/uploads/2021/02/Dumbbell-Shoulder-Press.gif",
        ),
        entry(
            Thursday,
            "Lateral Raise",
            "Shoulder",
            "4 Sets",
            "15 Reps",
            "Raise the arms out to the sides up to shoulder height.",
            "https://fitnessprogramer.com/wp-content/uploads/2021/02/Dumbbell-Lateral-Raise.gif",
        ),
        // Friday: deadlift and arms
        entry(
            Friday,
            "Deadlift",
            "Back & Legs",
            "3 Sets",
            "5 Reps",
            "Lift the bar from the floor with a straight back and a proud chest.",
            "https://fitnessprogramer.com/wp-content/uploads/2021/02/Barbell-Deadlift.gif",
        ),
        entry(
            Friday,
            "Hammer Curl",
            "Bicep",
            "3 Sets",
            "12 Reps",
            "Hold the dumbbells with a neutral grip, like a hammer, and curl towards the shoulders.",
            "https://fitnessprogramer.com/wp-content/uploads/2021/02/Hammer-Curl.gif",
        ),
    ]
}

impl ProgramEntry {
    /// Create a fresh, unchecked workout record from this entry
    pub fn to_workout(&self) -> Workout {
        Workout {
            id: Uuid::new_v4(),
            day: self.day,
            exercise_name: self.exercise_name.clone(),
            muscle_group: self.muscle_group.clone(),
            sets: self.sets.clone(),
            reps: self.reps.clone(),
            instructions: self.instructions.clone(),
            image_url: self.image_url.clone(),
            completed: false,
            weight_kg: 0.0,
        }
    }
}

/// Validate a program, returning a list of problems
pub fn validate_program(program: &[ProgramEntry]) -> Vec<String> {
    let mut errors = Vec::new();

    for (idx, entry) in program.iter().enumerate() {
        if entry.exercise_name.trim().is_empty() {
            errors.push(format!("Entry {} has empty exercise name", idx));
        }
        if entry.muscle_group.trim().is_empty() {
            errors.push(format!("'{}' has empty muscle group", entry.exercise_name));
        }
        if entry.sets.is_empty() || entry.reps.is_empty() {
            errors.push(format!("'{}' is missing sets or reps", entry.exercise_name));
        }
    }

    for (idx, entry) in program.iter().enumerate() {
        if program[..idx]
            .iter()
            .any(|e| e.day == entry.day && e.exercise_name == entry.exercise_name)
        {
            errors.push(format!(
                "'{}' appears twice on {}",
                entry.exercise_name, entry.day
            ));
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_loads() {
        assert_eq!(default_program().len(), 16);
    }

    #[test]
    fn test_default_program_validates() {
        let errors = validate_program(default_program());
        assert!(errors.is_empty(), "Program errors: {:?}", errors);
    }

    #[test]
    fn test_weekday_coverage() {
        let count = |day| default_program().iter().filter(|e| e.day == day).count();
        assert_eq!(count(DayOfWeek::Monday), 4);
        assert_eq!(count(DayOfWeek::Wednesday), 4);
        assert_eq!(count(DayOfWeek::Friday), 2);
        assert_eq!(count(DayOfWeek::Sunday), 0);
    }

    #[test]
    fn test_to_workout_creates_fresh_records() {
        let entry = &default_program()[0];
        let a = entry.to_workout();
        let b = entry.to_workout();
        assert_ne!(a.id, b.id);
        assert!(!a.completed);
        assert_eq!(a.weight_kg, 0.0);
        assert_eq!(a.exercise_name, "Bench Press");
    }

    #[test]
    fn test_validate_flags_duplicates() {
        let mut program = default_program().to_vec();
        program.push(program[0].clone());
        program[1].muscle_group.clear();
        let errors = validate_program(&program);
        assert_eq!(errors.len(), 2);
    }
}
