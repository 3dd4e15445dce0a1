//! Handlers for `fitpal profile` subcommands.

use anyhow::Result;
use sqlx::PgPool;

use fitpal_core::profile::{ProfileInput, ProfileView, create_profile, get_profile, update_profile};

use crate::config::FitpalConfig;
use crate::resolve::resolve_user;
use crate::{ProfileArgs, ProfileCommands};

impl ProfileArgs {
    fn into_input(self) -> ProfileInput {
        ProfileInput {
            age: self.age,
            gender: self.gender,
            current_weight: self.weight,
            height_cm: self.height,
            activity_level: self.activity_level,
            goal: self.goal,
            dietary_preferences: self.dietary_preferences,
            allergies: self.allergies,
            liked_foods: self.liked_foods,
            disliked_foods: self.disliked_foods,
            disabilities: self.disabilities,
            medical_conditions: self.medical_conditions,
            notification_reminders_enabled: self.notifications,
            email_reminders_enabled: self.email_reminders,
            minutes_before_email_reminder: self.email_reminder_minutes,
            tracking_enabled: self.tracking,
            track_after_rest_timer: self.track_after_rest_timer,
            start_rest_timer_after_exercise: self.rest_timer_after_exercise,
            time_zone: self.time_zone,
            breakfast_time: self.breakfast_time,
            lunch_time: self.lunch_time,
            dinner_time: self.dinner_time,
            snack_time: self.snack_time,
            workout_time: self.workout_time,
        }
    }
}

pub async fn run_profile_command(command: ProfileCommands, pool: &PgPool, config: &FitpalConfig) -> Result<()> {
    let user = resolve_user(pool, config.user.as_deref()).await?;
    match command {
        ProfileCommands::Create(args) => {
            let view = create_profile(pool, user.id, &args.into_input()).await?;
            println!("Profile created for {}.", user.username);
            println!();
            print_profile(&view);
        }
        ProfileCommands::Set(args) => {
            let view = update_profile(pool, user.id, &args.into_input()).await?;
            println!("Profile updated.");
            println!();
            print_profile(&view);
        }
        ProfileCommands::Show { json } => {
            let view = get_profile(pool, user.id).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                print_profile(&view);
            }
        }
    }
    Ok(())
}

fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn list(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}

fn print_profile(view: &ProfileView) {
    let p = &view.profile;
    println!("  Profile ID:     {}", p.id);
    println!("  Age:            {}", or_dash(p.age));
    println!("  Gender:         {}", or_dash(p.gender));
    println!("  Weight (kg):    {}", or_dash(p.current_weight));
    println!("  Height (cm):    {}", or_dash(p.height_cm));
    println!("  BMI:            {}", or_dash(view.bmi));
    println!("  Activity level: {}", or_dash(p.activity_level));
    println!("  Goal:           {}", or_dash(p.goal));
    println!("  Diet:           {}", list(&view.dietary_preferences_list));
    println!("  Allergies:      {}", list(&view.allergies_list));
    println!("  Likes:          {}", list(&view.liked_foods_list));
    println!("  Dislikes:       {}", list(&view.disliked_foods_list));
    println!("  Disabilities:   {}", list(&view.disabilities_list));
    println!("  Conditions:     {}", list(&view.medical_conditions_list));
    println!("  Time zone:      {}", p.time_zone);
    println!("  Workout time:   {}", p.workout_time.format("%H:%M"));
    println!("  Tracking:       {}", if p.tracking_enabled { "on" } else { "off" });
    println!(
        "  Email reminder: {}",
        if p.email_reminders_enabled {
            format!("{} min before", p.minutes_before_email_reminder)
        } else {
            "off".to_string()
        }
    );
    println!(
        "  Google:         {}",
        if p.connected_to_google_account { "connected" } else { "not connected" }
    );
}
