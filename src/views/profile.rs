//! Step 1 view: the device profile form.
//!
//! The form holds raw text the way input fields do and only parses it on
//! submit. It has no data dependency: submitting moves on to results using
//! whatever assessment the active scenario already loaded.

use std::fmt::Write;

use crate::contract::{Device, InputsEcho, Priority, Signals, UserPreferences};
use crate::error::FormError;

/// Field names accepted by [`ProfileForm::set`].
pub const FIELDS: [&str; 11] = [
    "brand",
    "model",
    "age_months",
    "battery_health_percent",
    "charge_cycles",
    "frame_drop_rate",
    "repair_history_count",
    "budget_priority",
    "sustainability_priority",
    "performance_priority",
    "prefers_financing",
];

/// Local step 1 form state.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileForm {
    pub brand: String,
    pub model: String,
    pub age_months: String,
    pub battery_health_percent: String,
    pub charge_cycles: String,
    pub frame_drop_rate: String,
    pub repair_history_count: String,
    pub budget_priority: String,
    pub sustainability_priority: String,
    pub performance_priority: String,
    pub prefers_financing: String,
}

impl Default for ProfileForm {
    fn default() -> Self {
        Self {
            brand: "Samsung".into(),
            model: "Galaxy S22".into(),
            age_months: "31".into(),
            battery_health_percent: "76".into(),
            charge_cycles: "702".into(),
            frame_drop_rate: "0.09".into(),
            repair_history_count: "1".into(),
            budget_priority: "medium".into(),
            sustainability_priority: "high".into(),
            performance_priority: "medium".into(),
            prefers_financing: "false".into(),
        }
    }
}

impl ProfileForm {
    /// Prefill the form from an assessment's input echo.
    pub fn from_echo(echo: &InputsEcho) -> Self {
        Self {
            brand: echo.device.brand.clone(),
            model: echo.device.model.clone(),
            age_months: echo.device.age_months.to_string(),
            battery_health_percent: echo.signals.battery_health_percent.to_string(),
            charge_cycles: echo.signals.charge_cycles.to_string(),
            frame_drop_rate: echo.signals.frame_drop_rate.to_string(),
            repair_history_count: echo.signals.repair_history_count.to_string(),
            budget_priority: echo.user_preferences.budget_priority.to_string(),
            sustainability_priority: echo.user_preferences.sustainability_priority.to_string(),
            performance_priority: echo.user_preferences.performance_priority.to_string(),
            prefers_financing: echo.user_preferences.prefers_financing.to_string(),
        }
    }

    /// Update one field by name. Values are not checked until submit.
    pub fn set(&mut self, field: &str, value: &str) -> Result<(), FormError> {
        let slot = match field {
            "brand" => &mut self.brand,
            "model" => &mut self.model,
            "age_months" => &mut self.age_months,
            "battery_health_percent" => &mut self.battery_health_percent,
            "charge_cycles" => &mut self.charge_cycles,
            "frame_drop_rate" => &mut self.frame_drop_rate,
            "repair_history_count" => &mut self.repair_history_count,
            "budget_priority" => &mut self.budget_priority,
            "sustainability_priority" => &mut self.sustainability_priority,
            "performance_priority" => &mut self.performance_priority,
            "prefers_financing" => &mut self.prefers_financing,
            other => {
                return Err(FormError::Invalid {
                    field: other.to_string(),
                    message: format!("unknown field; expected one of {}", FIELDS.join(", ")),
                });
            }
        };
        *slot = value.trim().to_string();
        Ok(())
    }

    /// Parse and range-check every field.
    pub fn submit(&self) -> Result<InputsEcho, FormError> {
        let brand = required("brand", &self.brand)?;
        let model = required("model", &self.model)?;
        let age_months = parse_number::<u32>("age_months", &self.age_months)?;

        let battery_health_percent =
            parse_number::<u8>("battery_health_percent", &self.battery_health_percent)?;
        if battery_health_percent > 100 {
            return Err(invalid("battery_health_percent", "must be in [0, 100]"));
        }
        let charge_cycles = parse_number::<u32>("charge_cycles", &self.charge_cycles)?;
        let frame_drop_rate = parse_number::<f64>("frame_drop_rate", &self.frame_drop_rate)?;
        if !(0.0..=1.0).contains(&frame_drop_rate) {
            return Err(invalid("frame_drop_rate", "must be in [0, 1]"));
        }
        let repair_history_count =
            parse_number::<u32>("repair_history_count", &self.repair_history_count)?;

        let prefers_financing = match required("prefers_financing", &self.prefers_financing)?
            .to_lowercase()
            .as_str()
        {
            "true" | "yes" | "evet" => true,
            "false" | "no" | "hayır" => false,
            _ => return Err(invalid("prefers_financing", "must be true or false")),
        };

        Ok(InputsEcho {
            device: Device {
                brand,
                model,
                age_months,
            },
            signals: Signals {
                battery_health_percent,
                charge_cycles,
                frame_drop_rate,
                repair_history_count,
            },
            user_preferences: UserPreferences {
                budget_priority: parse_priority("budget_priority", &self.budget_priority)?,
                sustainability_priority: parse_priority(
                    "sustainability_priority",
                    &self.sustainability_priority,
                )?,
                performance_priority: parse_priority(
                    "performance_priority",
                    &self.performance_priority,
                )?,
                prefers_financing,
            },
        })
    }
}

fn required(field: &str, value: &str) -> Result<String, FormError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(FormError::Missing {
            field: field.to_string(),
        });
    }
    Ok(value.to_string())
}

fn invalid(field: &str, message: &str) -> FormError {
    FormError::Invalid {
        field: field.to_string(),
        message: message.to_string(),
    }
}

fn parse_number<T: std::str::FromStr>(field: &str, value: &str) -> Result<T, FormError> {
    required(field, value)?
        .parse()
        .map_err(|_| invalid(field, "not a valid number"))
}

fn parse_priority(field: &str, value: &str) -> Result<Priority, FormError> {
    required(field, value)?
        .to_lowercase()
        .parse()
        .map_err(|_| invalid(field, "must be low, medium or high"))
}

/// Render the form.
pub fn render_profile(form: &ProfileForm) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Cihaz Profili");
    let rows = [
        ("Marka", "brand", &form.brand),
        ("Model", "model", &form.model),
        ("Cihaz yaşı (ay)", "age_months", &form.age_months),
        ("Batarya sağlığı (%)", "battery_health_percent", &form.battery_health_percent),
        ("Şarj döngüsü", "charge_cycles", &form.charge_cycles),
        ("Kare düşme oranı", "frame_drop_rate", &form.frame_drop_rate),
        ("Onarım geçmişi", "repair_history_count", &form.repair_history_count),
        ("Bütçe önceliği", "budget_priority", &form.budget_priority),
        ("Sürdürülebilirlik önceliği", "sustainability_priority", &form.sustainability_priority),
        ("Performans önceliği", "performance_priority", &form.performance_priority),
        ("Finansman tercihi", "prefers_financing", &form.prefers_financing),
    ];
    for (label, field, value) in rows {
        let _ = writeln!(out, "  {label:<28} {value:<14} ({field})");
    }
    let _ = writeln!(out, "\n  > evaluate  (Değerlendir)");
    out
}
