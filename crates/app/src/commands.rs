use std::fs;

use academy_core::Catalog;
use academy_core::catalog::LessonLocation;
use academy_core::model::{
    Achievement, ApiProvider, Course, Lesson, ModelParameters, SettingsPatch, UserProgress,
    builtin_achievements,
};
use anyhow::{Context, bail};
use services::AppServices;

use crate::cli::{Command, PlaygroundCommand, SettingsCommand};

pub async fn dispatch(command: Command, app: &AppServices) -> anyhow::Result<()> {
    let catalog = app.catalog();
    match command {
        Command::Courses { search } => {
            let courses = match search.as_deref() {
                Some(query) => catalog.search_courses(query),
                None => catalog.all_courses().iter().collect(),
            };
            let progress = app.progress().get_user_progress().await?;
            for course in courses {
                print_course_line(course, &progress);
            }
        }
        Command::Course { slug } => {
            let course = catalog
                .course_by_slug(&slug)
                .with_context(|| format!("no course with slug {slug}"))?;
            let progress = app.progress().get_user_progress().await?;
            print_course_outline(&catalog, course, &progress);
        }
        Command::Lesson {
            course_slug,
            lesson_slug,
        } => {
            let lesson = catalog
                .lesson_by_slug(&course_slug, &lesson_slug)
                .with_context(|| format!("no lesson {lesson_slug} in course {course_slug}"))?;
            print_lesson(&catalog, lesson);
        }
        Command::Start { lesson_id } => {
            let loc = locate(&catalog, &lesson_id)?;
            app.progress()
                .start_lesson(&loc.course.id, &loc.module.id, &loc.lesson.id)
                .await?;
            println!("started {}", loc.lesson.title);
        }
        Command::Complete { lesson_id } => {
            let loc = locate(&catalog, &lesson_id)?;
            let progress = app.progress();
            let outcome = progress
                .complete_lesson(&loc.course.id, &loc.module.id, &loc.lesson.id)
                .await?;
            println!("completed {}", loc.lesson.title);
            if outcome.module_completed {
                println!("module complete: {}", loc.module.title);
            }
            if outcome.course_completed {
                println!("course complete: {}", loc.course.title);
            }
            for achievement in progress.check_achievements(&builtin_achievements()).await? {
                print_achievement(&achievement);
            }
            if let Some(next) = catalog.next_lesson(&lesson_id) {
                println!("next: {} ({})", next.title, next.id);
            }
        }
        Command::Next { lesson_id } => {
            locate(&catalog, &lesson_id)?;
            match catalog.next_lesson(&lesson_id) {
                Some(lesson) => println!("{} ({})", lesson.title, lesson.id),
                None => println!("end of course"),
            }
        }
        Command::Prev { lesson_id } => {
            locate(&catalog, &lesson_id)?;
            match catalog.previous_lesson(&lesson_id) {
                Some(lesson) => println!("{} ({})", lesson.title, lesson.id),
                None => println!("start of course"),
            }
        }
        Command::Progress { json } => {
            let progress = app.progress().get_user_progress().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&progress)?);
            } else {
                print_progress_summary(&catalog, &progress);
            }
        }
        Command::Achievements => {
            let progress = app.progress().get_user_progress().await?;
            if progress.achievements.is_empty() {
                println!("no achievements yet");
            }
            for achievement in &progress.achievements {
                print_achievement(achievement);
            }
        }
        Command::Reset => {
            app.progress().reset_progress().await?;
            println!("progress reset");
        }
        Command::Settings(command) => settings(command, app).await?,
        Command::Playground(command) => playground(command, app).await?,
    }
    Ok(())
}

async fn settings(command: SettingsCommand, app: &AppServices) -> anyhow::Result<()> {
    let service = app.settings();
    match command {
        SettingsCommand::Show => {
            let settings = service.load().await?;
            println!("theme: {:?}", settings.theme);
            println!("code theme: {}", settings.code_theme);
            println!("font size: {:?}", settings.font_size);
            for provider in [ApiProvider::Anthropic, ApiProvider::Openai] {
                let state = if settings.api_key(provider).is_some() { "set" } else { "not set" };
                println!("{provider:?} key: {state}");
            }
            if let Some(url) = &settings.api_base_url {
                println!("api base url: {url}");
            }
            println!("daily goal: {} min", settings.learning.daily_goal);
        }
        SettingsCommand::SetKey { provider, key } => {
            service.set_api_key(provider.into(), Some(key)).await?;
            println!("key updated");
        }
        SettingsCommand::SetBaseUrl { url } => {
            let patch = SettingsPatch {
                api_base_url: Some(url),
                ..SettingsPatch::new()
            };
            let settings = service.update(patch).await?;
            match settings.api_base_url {
                Some(url) => println!("api base url: {url}"),
                None => println!("api base url cleared"),
            }
        }
        SettingsCommand::ClearKeys => {
            service.clear_api_keys().await?;
            println!("keys cleared");
        }
        SettingsCommand::ToggleTheme => {
            let theme = service.toggle_theme().await?;
            println!("theme: {theme:?}");
        }
    }
    Ok(())
}

async fn playground(command: PlaygroundCommand, app: &AppServices) -> anyhow::Result<()> {
    let service = app.playground();
    match command {
        PlaygroundCommand::Run {
            prompt,
            system,
            temperature,
            max_tokens,
        } => {
            let mut parameters = ModelParameters::default();
            if let Some(temperature) = temperature {
                parameters.temperature = temperature;
            }
            if let Some(max_tokens) = max_tokens {
                parameters.max_tokens = max_tokens;
            }
            let session = service
                .create_session(&prompt, system.as_deref(), parameters)
                .await?;
            match (&session.response, &session.error) {
                (_, Some(error)) => println!("error: {error}"),
                (Some(response), None) => println!("{response}"),
                (None, None) => println!("(no response)"),
            }
            if let Some(usage) = &session.tokens_used {
                println!(
                    "tokens: {} in / {} out, ~${:.4}",
                    usage.prompt_tokens,
                    usage.completion_tokens,
                    usage.estimated_cost.unwrap_or_default()
                );
            }
        }
        PlaygroundCommand::History => {
            for session in service.history().await? {
                let status = if session.is_failed() { "failed" } else { "ok" };
                println!("{} [{status}] {}", session.timestamp.to_rfc3339(), session.prompt);
            }
        }
        PlaygroundCommand::Export { out } => {
            let json = service.export_sessions().await?;
            match out {
                Some(path) => {
                    fs::write(&path, json)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!("exported to {}", path.display());
                }
                None => println!("{json}"),
            }
        }
        PlaygroundCommand::Import { path } => {
            let json = fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let merged = service.import_sessions(&json).await?;
            println!("history now holds {} sessions", merged.len());
        }
        PlaygroundCommand::Stats => {
            let stats = service.usage_statistics().await?;
            println!(
                "sessions: {} ({} ok, {} failed)",
                stats.total_sessions, stats.successful_sessions, stats.failed_sessions
            );
            println!(
                "tokens: {} total, {} avg",
                stats.total_tokens, stats.average_tokens_per_session
            );
            println!("cost: ${:.2}", stats.total_cost);
        }
        PlaygroundCommand::Clear => {
            service.clear_history().await?;
            println!("history cleared");
        }
    }
    Ok(())
}

fn locate<'a>(catalog: &'a Catalog, lesson_id: &str) -> anyhow::Result<LessonLocation<'a>> {
    match catalog.locate_lesson(lesson_id) {
        Some(loc) => Ok(loc),
        None => bail!("no lesson with id {lesson_id}"),
    }
}

fn print_course_line(course: &Course, progress: &UserProgress) {
    let percent = progress
        .course(course.id.as_str())
        .map_or(0.0, |c| c.completion_percentage);
    println!(
        "{:<20} {:<32} {:<12} {:>3.0}%",
        course.slug,
        course.title,
        course.difficulty.label(),
        percent
    );
}

fn print_course_outline(catalog: &Catalog, course: &Course, progress: &UserProgress) {
    print_course_line(course, progress);
    let prereqs: Vec<_> = catalog
        .prerequisite_courses(course.id.as_str())
        .into_iter()
        .map(|c| c.title.as_str())
        .collect();
    if !prereqs.is_empty() {
        println!("requires: {}", prereqs.join(", "));
    }
    for module in &course.modules {
        let record = progress.module(course.id.as_str(), module.id.as_str());
        let percent = record.map_or(0.0, |m| m.completion_percentage);
        println!("  {}. {} ({percent:.0}%)", module.order, module.title);
        for lesson in &module.lessons {
            let done = record.is_some_and(|m| m.is_lesson_completed(lesson.id.as_str()));
            let mark = if done { "x" } else { " " };
            println!("     [{mark}] {} ({}, {} min)", lesson.title, lesson.slug, lesson.estimated_minutes);
        }
    }
}

fn print_lesson(catalog: &Catalog, lesson: &Lesson) {
    println!("{} ({})", lesson.title, lesson.id);
    for objective in &lesson.objectives {
        println!("  - {objective}");
    }
    println!();
    println!("{}", lesson.content);
    if let Some(exercise) = &lesson.exercise {
        println!();
        println!(
            "exercise: {} [{}] {} pts",
            exercise.title,
            exercise.content.kind(),
            exercise.points
        );
    }
    if let Some(prev) = catalog.previous_lesson(lesson.id.as_str()) {
        println!("prev: {}", prev.slug);
    }
    if let Some(next) = catalog.next_lesson(lesson.id.as_str()) {
        println!("next: {}", next.slug);
    }
}

fn print_progress_summary(catalog: &Catalog, progress: &UserProgress) {
    println!("points: {}", progress.total_points);
    println!("streak: {} days", progress.streak);
    println!("last activity: {}", progress.last_activity_date.to_rfc3339());
    for record in &progress.courses {
        let title = catalog
            .course_by_id(record.course_id.as_str())
            .map_or(record.course_id.as_str(), |c| c.title.as_str());
        let done = if record.is_completed() { " (completed)" } else { "" };
        println!(
            "  {title}: {:.0}%{done}, {} min",
            record.completion_percentage, record.total_time_spent
        );
    }
}

fn print_achievement(achievement: &Achievement) {
    println!(
        "achievement: {} ({} pts) {}",
        achievement.title, achievement.points, achievement.description
    );
}
