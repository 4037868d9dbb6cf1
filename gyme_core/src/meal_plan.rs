//! Meal plan generator.
//!
//! Builds a day of meals for a calorie target and goal. Each slot draws one
//! item from a fixed food table and scales its base portion by a
//! goal-specific multiplier; leftover calories become one or two snacks.
//! The only randomness is which table entry is drawn, and the random source
//! is supplied by the caller.

use crate::{Goal, Meal, MealConfig, MealType};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use uuid::Uuid;

/// A food at its standard (maintenance) portion
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FoodItem {
    pub name: &'static str,
    pub base_amount: i32,
    pub unit: &'static str,
    pub base_calories: i32,
    pub base_protein_g: i32,
}

const fn food(
    name: &'static str,
    base_amount: i32,
    unit: &'static str,
    base_calories: i32,
    base_protein_g: i32,
) -> FoodItem {
    FoodItem {
        name,
        base_amount,
        unit,
        base_calories,
        base_protein_g,
    }
}

/// Energy sources
pub const CARBS: &[FoodItem] = &[
    food("White Rice", 100, "g", 130, 2),
    food("Brown Rice", 100, "g", 110, 3),
    food("Boiled Corn", 100, "g", 96, 3),
    food("Boiled Potato", 150, "g", 130, 3),
    food("Baked Sweet Potato", 150, "g", 150, 2),
    food("Oatmeal", 50, "g", 190, 6),
    food("Whole Wheat Bread", 2, "slices", 140, 6),
    food("Pasta / Spaghetti", 80, "g", 130, 5),
];

pub const PROTEINS: &[FoodItem] = &[
    food("Grilled Chicken Breast", 100, "g", 165, 31),
    food("Boiled Chicken Breast", 100, "g", 150, 30),
    food("Boiled Eggs", 2, "eggs", 155, 13),
    food("Egg Whites", 3, "eggs", 51, 11),
    food("Mackerel", 100, "g", 160, 18),
    food("Salmon", 100, "g", 200, 20),
    food("Grilled Tempeh", 3, "pieces", 160, 15),
    food("Tofu", 4, "cubes", 100, 10),
    food("Lean Black Pepper Beef", 100, "g", 200, 22),
    food("Whey Protein", 1, "scoop", 120, 24),
];

pub const VEGETABLES: &[FoodItem] = &[
    food("Stir-fried Water Spinach", 1, "small plate", 60, 2),
    food("Clear Vegetable Soup", 1, "bowl", 50, 1),
    food("Capcay Soup", 1, "bowl", 70, 2),
    food("Green Salad", 1, "plate", 40, 1),
    food("Steamed Broccoli", 100, "g", 35, 3),
    food("Cucumber & Tomato", 1, "serving", 20, 1),
    food("Boiled Spinach", 1, "bowl", 23, 3),
];

pub const FATS_AND_FRUITS: &[FoodItem] = &[
    food("Avocado", 1, "medium fruit", 320, 4),
    food("Banana", 1, "fruit", 105, 1),
    food("Fuji Apple", 1, "fruit", 60, 0),
    food("Almonds", 15, "nuts", 105, 4),
    food("Low Fat Milk", 200, "ml", 100, 8),
    food("Olive Oil (cooking)", 1, "tbsp", 80, 0),
    food("Plain Yogurt", 1, "cup", 60, 3),
];

/// Which table a slot draws from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum FoodCategory {
    Carb,
    Protein,
    Vegetable,
    FatOrFruit,
}

impl FoodCategory {
    pub fn table(&self) -> &'static [FoodItem] {
        match self {
            FoodCategory::Carb => CARBS,
            FoodCategory::Protein => PROTEINS,
            FoodCategory::Vegetable => VEGETABLES,
            FoodCategory::FatOrFruit => FATS_AND_FRUITS,
        }
    }
}

/// One draw in the daily plan
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlotPick {
    pub meal_type: MealType,
    pub category: FoodCategory,
    pub multiplier: f64,
}

/// Carb and protein portion multipliers for a goal
pub fn goal_multipliers(goal: Goal) -> (f64, f64) {
    match goal {
        Goal::Bulking => (2.0, 1.5),
        Goal::Cutting => (0.8, 1.2),
        Goal::Maintenance => (1.0, 1.0),
    }
}

/// The fixed breakfast/lunch/dinner draws for a goal
///
/// Cutting dinners replace the carb with half a portion of fat or fruit.
pub fn slot_plan(goal: Goal) -> Vec<SlotPick> {
    let (carb_m, protein_m) = goal_multipliers(goal);
    let pick = |meal_type, category, multiplier| SlotPick {
        meal_type,
        category,
        multiplier,
    };

    let breakfast_carb = if goal == Goal::Bulking { 1.5 } else { 1.0 };

    let mut plan = vec![
        pick(MealType::Breakfast, FoodCategory::Carb, breakfast_carb),
        pick(MealType::Breakfast, FoodCategory::Protein, 1.0),
        pick(MealType::Lunch, FoodCategory::Carb, carb_m),
        pick(MealType::Lunch, FoodCategory::Protein, protein_m),
        pick(MealType::Lunch, FoodCategory::Vegetable, 1.0),
    ];

    if goal == Goal::Cutting {
        plan.extend([
            pick(MealType::Dinner, FoodCategory::Protein, 1.0),
            pick(MealType::Dinner, FoodCategory::Vegetable, 1.0),
            pick(MealType::Dinner, FoodCategory::FatOrFruit, 0.5),
        ]);
    } else {
        plan.extend([
            pick(MealType::Dinner, FoodCategory::Carb, carb_m * 0.8),
            pick(MealType::Dinner, FoodCategory::Protein, protein_m),
            pick(MealType::Dinner, FoodCategory::FatOrFruit, 1.0),
        ]);
    }

    plan
}

/// Scale a food to a portion and turn it into a meal entry
pub fn portion(
    item: &FoodItem,
    meal_type: MealType,
    multiplier: f64,
    eaten_at: DateTime<Utc>,
) -> Meal {
    let amount = (f64::from(item.base_amount) * multiplier) as i32;
    let calories = (f64::from(item.base_calories) * multiplier) as i32;
    let protein_g = (f64::from(item.base_protein_g) * multiplier) as i32;

    Meal {
        id: Uuid::new_v4(),
        name: format!("{} ({} {})", item.name, amount, item.unit),
        calories,
        protein_g,
        meal_type,
        eaten_at,
    }
}

fn snack(name: &str, calories: i32, protein_g: i32, eaten_at: DateTime<Utc>) -> Meal {
    Meal {
        id: Uuid::new_v4(),
        name: name.to_string(),
        calories,
        protein_g,
        meal_type: MealType::Snack,
        eaten_at,
    }
}

/// Generate a day of meals
///
/// Slot calories rarely hit the target exactly; the gap is filled with
/// snacks. Above `split_snack_above_kcal` it is split in two, above
/// `min_snack_kcal` a single snack absorbs it, otherwise it is left.
pub fn generate_meal_plan<R: Rng + ?Sized>(
    target_calories: i32,
    goal: Goal,
    eaten_at: DateTime<Utc>,
    rng: &mut R,
    config: &MealConfig,
) -> Vec<Meal> {
    let mut plan: Vec<Meal> = slot_plan(goal)
        .into_iter()
        .map(|slot| {
            let table = slot.category.table();
            let item = &table[rng.gen_range(0..table.len())];
            portion(item, slot.meal_type, slot.multiplier, eaten_at)
        })
        .collect();

    let assigned: i32 = plan.iter().map(|m| m.calories).sum();
    let remaining = target_calories - assigned;
    let bulking = goal == Goal::Bulking;

    if remaining > config.split_snack_above_kcal {
        let first = remaining / 2;
        let second = remaining - first;
        let (first_name, second_name) = if bulking {
            ("Whey Protein / Mass Gainer", "Peanut Butter Toast")
        } else {
            ("Yogurt + Granola", "Almonds")
        };
        plan.push(snack(first_name, first, 20, eaten_at));
        plan.push(snack(second_name, second, 10, eaten_at));
    } else if remaining > config.min_snack_kcal {
        let name = if bulking {
            "Full Cream Milk + Banana"
        } else {
            "Sliced Apple / Pear"
        };
        plan.push(snack(name, remaining, 5, eaten_at));
    }

    tracing::info!(
        "Generated {} plan: {} entries, {} kcal assigned of {} target",
        goal,
        plan.len(),
        plan.iter().map(|m| m.calories).sum::<i32>(),
        target_calories
    );

    plan
}

/// Order meals breakfast, lunch, dinner, snack
pub fn sort_by_meal_type(meals: &mut [Meal]) {
    meals.sort_by_key(|m| m.meal_type.order());
}

/// Calories eaten against the day's target
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DailyIntake {
    pub target: i32,
    pub eaten: i32,
    pub remaining: i32,
    pub protein_g: i32,
}

impl DailyIntake {
    pub fn from_meals(target: i32, meals: &[Meal]) -> Self {
        let eaten = meals.iter().map(|m| m.calories).sum();
        Self {
            target,
            eaten,
            remaining: target - eaten,
            protein_g: meals.iter().map(|m| m.protein_g).sum(),
        }
    }

    pub fn is_over(&self) -> bool {
        self.remaining < 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 7, 0, 0).unwrap()
    }

    fn slot_total(goal: Goal, seed: u64) -> i32 {
        let mut rng = StdRng::seed_from_u64(seed);
        generate_meal_plan(0, goal, now(), &mut rng, &MealConfig::default())
            .iter()
            .map(|m| m.calories)
            .sum()
    }

    fn generate(target: i32, goal: Goal, seed: u64) -> Vec<Meal> {
        let mut rng = StdRng::seed_from_u64(seed);
        generate_meal_plan(target, goal, now(), &mut rng, &MealConfig::default())
    }

    fn snacks(plan: &[Meal]) -> Vec<&Meal> {
        plan.iter().filter(|m| m.meal_type == MealType::Snack).collect()
    }

    #[test]
    fn test_same_seed_same_plan() {
        let a: Vec<_> = generate(2500, Goal::Maintenance, 7).into_iter().map(|m| m.name).collect();
        let b: Vec<_> = generate(2500, Goal::Maintenance, 7).into_iter().map(|m| m.name).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_large_gap_split_into_two_snacks() {
        for seed in 0..20 {
            let base = slot_total(Goal::Maintenance, seed);
            let target = base + 801;
            let plan = generate(target, Goal::Maintenance, seed);

            let snacks = snacks(&plan);
            assert_eq!(snacks.len(), 2);
            assert_eq!(snacks[0].calories, 400);
            assert_eq!(snacks[1].calories, 401);
            assert_eq!(plan.iter().map(|m| m.calories).sum::<i32>(), target);
        }
    }

    #[test]
    fn test_small_gap_single_snack() {
        let base = slot_total(Goal::Bulking, 3);
        let plan = generate(base + 400, Goal::Bulking, 3);
        let snacks = snacks(&plan);
        assert_eq!(snacks.len(), 1);
        assert_eq!(snacks[0].calories, 400);
        assert_eq!(snacks[0].name, "Full Cream Milk + Banana");
    }

    #[test]
    fn test_tiny_gap_no_snack() {
        for gap in [50, 10, 0, -300] {
            let base = slot_total(Goal::Cutting, 11);
            let plan = generate(base + gap, Goal::Cutting, 11);
            assert!(snacks(&plan).is_empty(), "gap {} produced a snack", gap);
            assert_eq!(plan.len(), 8);
        }

        let base = slot_total(Goal::Cutting, 11);
        assert_eq!(snacks(&generate(base + 51, Goal::Cutting, 11)).len(), 1);
    }

    #[test]
    fn test_cutting_dinner_has_no_carb() {
        for seed in 0..50 {
            let plan = generate(1800, Goal::Cutting, seed);
            for meal in plan.iter().filter(|m| m.meal_type == MealType::Dinner) {
                assert!(
                    !CARBS.iter().any(|c| meal.name.starts_with(c.name)),
                    "cutting dinner contained carb {}",
                    meal.name
                );
            }
        }

        assert!(slot_plan(Goal::Cutting)
            .iter()
            .filter(|s| s.meal_type == MealType::Dinner)
            .all(|s| s.category != FoodCategory::Carb));
    }

    #[test]
    fn test_bulking_multipliers() {
        let plan = slot_plan(Goal::Bulking);
        assert_eq!(
            plan[0],
            SlotPick {
                meal_type: MealType::Breakfast,
                category: FoodCategory::Carb,
                multiplier: 1.5,
            }
        );
        assert_eq!(plan[2].multiplier, 2.0);
        assert_eq!(plan[3].multiplier, 1.5);
        assert!((plan[5].multiplier - 1.6).abs() < 1e-9);

        assert_eq!(slot_plan(Goal::Maintenance)[0].multiplier, 1.0);
    }

    #[test]
    fn test_portion_scaling() {
        let rice = CARBS[0];
        let meal = portion(&rice, MealType::Lunch, 2.0, now());
        assert_eq!(meal.name, "White Rice (200 g)");
        assert_eq!(meal.calories, 260);
        assert_eq!(meal.protein_g, 4);

        let avocado = FATS_AND_FRUITS[0];
        let half = portion(&avocado, MealType::Dinner, 0.5, now());
        assert_eq!(half.name, "Avocado (0 medium fruit)");
        assert_eq!(half.calories, 160);
    }

    #[test]
    fn test_sort_and_intake() {
        let mut plan = generate(3000, Goal::Maintenance, 5);
        plan.reverse();
        sort_by_meal_type(&mut plan);
        assert_eq!(plan.first().unwrap().meal_type, MealType::Breakfast);
        assert_eq!(plan.last().unwrap().meal_type, MealType::Snack);

        let intake = DailyIntake::from_meals(2000, &plan);
        assert_eq!(intake.eaten, 3000);
        assert_eq!(intake.remaining, -1000);
        assert!(intake.is_over());
    }
}
