//! Validation of the Practicum payload and formatting of status notifications.

use serde_json::Value;
use tracing::{debug, error};

use crate::{errors::Error, verdicts::HomeworkStatus, Result};

const PREVIEW_MAX_CHARS: usize = 300;

/// Check the structural shape of an API response and return its homework records.
///
/// An empty list is a normal answer (nothing changed since the cursor).
pub fn check_response(response: &Value) -> Result<&[Value]> {
    let Some(obj) = response.as_object() else {
        return Err(logged(Error::UnexpectedType(format!(
            "Ответ API не является словарём: {}",
            preview(response)
        ))));
    };

    let Some(homeworks) = obj.get("homeworks") else {
        return Err(logged(Error::MissingKey(format!(
            "Отсутствует ключ homeworks в ответе API: {}",
            preview(response)
        ))));
    };

    let Some(homeworks) = homeworks.as_array() else {
        return Err(logged(Error::UnexpectedType(format!(
            "Значение homeworks в ответе API не является списком: {}",
            preview(homeworks)
        ))));
    };

    if homeworks.is_empty() {
        debug!("no new homework statuses");
    }
    Ok(homeworks.as_slice())
}

/// Server-side timestamp to use as the next `from_date`, if the response carries one.
pub fn current_date(response: &Value) -> Option<i64> {
    response.get("current_date").and_then(Value::as_i64)
}

/// Build the notification text for a single homework record.
pub fn parse_status(homework: &Value) -> Result<String> {
    let Some(record) = homework.as_object() else {
        return Err(logged(Error::UnexpectedType(format!(
            "Запись о домашней работе не является словарём: {}",
            preview(homework)
        ))));
    };

    let missing: Vec<&str> = ["homework_name", "status"]
        .into_iter()
        .filter(|key| !record.contains_key(*key))
        .collect();
    if !missing.is_empty() {
        return Err(logged(Error::MissingKey(format!(
            "Отсутствуют необходимые ключи в записи о домашней работе: {}",
            missing.join(", ")
        ))));
    }

    let name = display_value(&record["homework_name"]);
    let raw_status = &record["status"];
    let Some(status) = raw_status.as_str().and_then(HomeworkStatus::from_code) else {
        return Err(logged(Error::UnknownStatus(format!(
            "Недокументированный статус домашней работы в ответе API: {}",
            display_value(raw_status)
        ))));
    };

    Ok(format_status(&name, status))
}

pub fn format_status(name: &str, status: HomeworkStatus) -> String {
    format!(
        "Изменился статус проверки работы \"{name}\". {}",
        status.verdict()
    )
}

fn logged(e: Error) -> Error {
    error!("{e}");
    e
}

fn display_value(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn preview(v: &Value) -> String {
    let text = v.to_string();
    if text.chars().count() <= PREVIEW_MAX_CHARS {
        return text;
    }
    let mut out = text.chars().take(PREVIEW_MAX_CHARS).collect::<String>();
    out.push_str("...");
    out
}
