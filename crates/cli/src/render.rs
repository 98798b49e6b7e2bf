//! Plain-text rendering of results for the terminal.

use std::fmt::{self, Write};
use studycoor_core::{ComplianceResult, VisitResult};

pub fn compliance_text(result: &ComplianceResult) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write_compliance(&mut out, result, "")?;
    Ok(out)
}

pub fn visit_text(result: &VisitResult) -> Result<String, fmt::Error> {
    if result.drugs.is_empty() {
        return Ok("No drugs in visit.\n".to_string());
    }

    let mut out = String::new();
    for (i, drug) in result.drugs.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        writeln!(out, "{}", drug.name)?;
        write_compliance(&mut out, &drug.result, "  ")?;
    }
    Ok(out)
}

fn write_compliance(out: &mut String, result: &ComplianceResult, indent: &str) -> fmt::Result {
    let e = &result.breakdown.expected;
    let a = &result.breakdown.actual;

    writeln!(out, "{indent}Period & Expected")?;
    writeln!(out, "{indent}  Days (inclusive)    {}", e.inclusive_days)?;
    writeln!(out, "{indent}  Hold days           {}", e.hold_days)?;
    writeln!(out, "{indent}  Effective days      {}", e.effective_days)?;
    match e.prn_target_per_day {
        Some(target) => writeln!(out, "{indent}  PRN target/day      {target:.2}")?,
        None => writeln!(out, "{indent}  Base per day        {:.2}", e.base_doses_per_day)?,
    }
    if e.first_day_adjustment != 0.0 {
        writeln!(out, "{indent}  First day adj.      {:+.2}", e.first_day_adjustment)?;
    }
    if e.last_day_adjustment != 0.0 {
        writeln!(out, "{indent}  Last day adj.       {:+.2}", e.last_day_adjustment)?;
    }
    writeln!(out, "{indent}  Expected            {:.2}", result.expected_doses)?;

    writeln!(out, "{indent}Actual")?;
    writeln!(out, "{indent}  Dispensed           {:.2}", a.dispensed)?;
    writeln!(out, "{indent}  Returned            {:.2}", a.returned)?;
    writeln!(out, "{indent}  Missed              {:.2}", a.missed)?;
    writeln!(out, "{indent}  Extra               {:.2}", a.extra)?;
    let partial = if a.partial_doses_enabled {
        "Allowed"
    } else {
        "Rounded"
    };
    writeln!(out, "{indent}  Partial doses       {partial}")?;
    writeln!(out, "{indent}  Actual              {:.2}", result.actual_doses)?;

    writeln!(out, "{indent}Compliance")?;
    writeln!(out, "{indent}  Compliance %        {:.1}%", result.compliance_pct)?;
    for (token, description) in result
        .flag_tokens()
        .iter()
        .zip(result.flag_descriptions())
    {
        writeln!(out, "{indent}  Flag                {token} ({description})")?;
    }
    Ok(())
}
