use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use time::{Date, Month, OffsetDateTime};
use tracing::{debug, warn};

use crate::db::repositories::{CourseRepository, ProgressRepository, UserRepository};
use crate::error::AppError;
use crate::services::{activity, cloner, notifier::Notifier, settings};

/// System-settings key holding the JSON rule table; compiled-in defaults
/// apply when the setting is absent or unparsable.
pub const RULES_SETTING_KEY: &str = "auto_assignment.rules";

/// Maps a completed course (by title fragment) to the exact title of the
/// follow-on assessment template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentRule {
    pub title_fragment: String,
    pub template_title: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Assignment {
    pub course_id: i64,
    pub course_title: String,
}

pub fn default_rules() -> Vec<AssignmentRule> {
    vec![
        AssignmentRule {
            title_fragment: "MOT Class 1 & 2 Training".to_string(),
            template_title: "MOT Class 1 & 2 Annual Assessment".to_string(),
        },
        AssignmentRule {
            title_fragment: "MOT Class 4 & 7 Training".to_string(),
            template_title: "MOT Class 4 & 7 Annual Assessment".to_string(),
        },
    ]
}

pub fn parse_rules(raw: &str) -> Option<Vec<AssignmentRule>> {
    serde_json::from_str(raw).ok()
}

pub fn match_rule<'a>(rules: &'a [AssignmentRule], title: &str) -> Option<&'a AssignmentRule> {
    rules.iter().find(|r| title.contains(&r.title_fragment))
}

/// Assignment window: starts today, ends one calendar month later with the
/// day-of-month clamped to the target month's length.
pub fn schedule_window(today: Date) -> (Date, Date) {
    (today, add_one_month(today))
}

fn add_one_month(date: Date) -> Date {
    let (year, month) = match date.month() {
        Month::December => (date.year() + 1, Month::January),
        m => (date.year(), m.next()),
    };
    let day = date.day().min(month.length(year));
    Date::from_calendar_date(year, month, day).unwrap_or(date)
}

/// Scheduling label appended to assignment titles, e.g. "September 2026".
pub fn month_year_label(date: Date) -> String {
    format!("{} {}", date.month(), date.year())
}

/// Decides whether completing `completed_course_id` earns the learner an
/// automatic follow-on assessment and, if so, clones the matching template,
/// enrolls the learner and notifies them.
///
/// Negative outcomes are ordinary: an unmatched title or a missing target
/// template returns `None` without error. The clone and the enrollment share
/// one transaction. The system-triggered enrollment deliberately skips the
/// capacity check.
pub async fn maybe_chain(
    pool: &SqlitePool,
    notifier: &dyn Notifier,
    user_id: i64,
    completed_course_id: i64,
) -> Result<Option<Assignment>, AppError> {
    let Some(completed) = CourseRepository::find_by_id(pool, completed_course_id).await? else {
        return Ok(None);
    };

    let raw = settings::get_setting(pool, RULES_SETTING_KEY, "").await;
    let rules = if raw.is_empty() {
        default_rules()
    } else {
        parse_rules(&raw).unwrap_or_else(|| {
            warn!(key = RULES_SETTING_KEY, "unparsable rule table, using defaults");
            default_rules()
        })
    };

    let Some(rule) = match_rule(&rules, &completed.title) else {
        return Ok(None);
    };

    let Some(template) =
        CourseRepository::find_template_by_title(pool, &rule.template_title).await?
    else {
        debug!(
            template_title = %rule.template_title,
            "no assessment template with that title, skipping auto-assignment"
        );
        return Ok(None);
    };

    let today = OffsetDateTime::now_utc().date();
    let (start_date, end_date) = schedule_window(today);
    let title = format!("{} - {}", template.title, month_year_label(today));

    let mut tx = pool.begin().await?;
    let cloned = cloner::clone_course(
        &mut tx,
        cloner::CloneSpec {
            template_id: template.id,
            start_date,
            end_date,
            title_override: Some(&title),
            copy_questions: true,
        },
    )
    .await?;
    ProgressRepository::upsert_enrollment(&mut *tx, user_id, cloned.course_id, today).await?;
    tx.commit().await?;

    if let Some(user) = UserRepository::find_by_id(pool, user_id).await? {
        let delivered = notifier
            .send(
                &user.email,
                "New assessment assigned",
                &format!("You have been enrolled in '{}', due by {}.", title, end_date),
            )
            .await;
        debug!(delivered, user_id, "auto-assignment notification");
        activity::record(
            pool,
            Some(user_id),
            Some(&user.email),
            "course_auto_assigned",
            &format!("'{}' assigned after completing '{}'", title, completed.title),
        )
        .await;
    }

    Ok(Some(Assignment {
        course_id: cloned.course_id,
        course_title: title,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn default_rules_match_training_titles() {
        let rules = default_rules();
        let rule = match_rule(&rules, "MOT Class 4 & 7 Training — Spring").unwrap();
        assert_eq!(rule.template_title, "MOT Class 4 & 7 Annual Assessment");

        let rule = match_rule(&rules, "MOT Class 1 & 2 Training 2025").unwrap();
        assert_eq!(rule.template_title, "MOT Class 1 & 2 Annual Assessment");
    }

    #[test]
    fn unrelated_titles_do_not_match() {
        let rules = default_rules();
        assert!(match_rule(&rules, "Safety 101").is_none());
        assert!(match_rule(&rules, "MOT Class 3 Training").is_none());
    }

    #[test]
    fn rules_round_trip_through_json() {
        let rules = default_rules();
        let raw = serde_json::to_string(&rules).unwrap();
        assert_eq!(parse_rules(&raw).unwrap(), rules);
    }

    #[test]
    fn invalid_rule_json_is_rejected() {
        assert!(parse_rules("not json").is_none());
        assert!(parse_rules(r#"{"title_fragment": "x"}"#).is_none());
    }

    #[test]
    fn one_month_window_clamps_to_month_end() {
        assert_eq!(schedule_window(date!(2025 - 01 - 31)).1, date!(2025 - 02 - 28));
        assert_eq!(schedule_window(date!(2024 - 01 - 31)).1, date!(2024 - 02 - 29));
        assert_eq!(schedule_window(date!(2025 - 06 - 15)).1, date!(2025 - 07 - 15));
    }

    #[test]
    fn december_rolls_into_next_year() {
        assert_eq!(schedule_window(date!(2025 - 12 - 10)).1, date!(2026 - 01 - 10));
    }

    #[test]
    fn schedule_label_is_month_and_year() {
        assert_eq!(month_year_label(date!(2026 - 09 - 03)), "September 2026");
    }
}
