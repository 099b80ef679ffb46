use chrono::NaiveDate;

use crate::error::ApiError;
use crate::model::attendance::DayRecord;

const HEADER: [&str; 7] = [
    "Employee ID",
    "Name",
    "Date",
    "Status",
    "Check In",
    "Check Out",
    "Total Hours",
];

/// Flattens a filtered manager result set into CSV. Synthetic absences
/// carry no date of their own, so the queried day is passed in as a
/// fallback. Field escaping is left to the csv writer.
pub fn attendance_csv(
    records: &[DayRecord],
    query_date: Option<NaiveDate>,
) -> Result<String, ApiError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADER)?;

    for record in records {
        let user = record.user();
        let date = record
            .date()
            .or(query_date)
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        let check_in = record
            .check_in_time()
            .map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        let check_out = record
            .check_out_time()
            .map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        let total_hours = record.total_hours().unwrap_or(0.0);

        writer.write_record([
            user.employee_id.as_str(),
            user.name.as_str(),
            date.as_str(),
            record.status().to_string().as_str(),
            check_in.as_str(),
            check_out.as_str(),
            total_hours.to_string().as_str(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|_| ApiError::Internal)?;
    String::from_utf8(bytes).map_err(|_| ApiError::Internal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendance::{
        AbsentEntry, Attendance, AttendanceStatus, AttendanceWithUser,
    };
    use crate::model::user::EmployeeInfo;

    fn employee(id: i64, name: &str) -> EmployeeInfo {
        EmployeeInfo {
            id,
            name: name.to_string(),
            email: format!("user{id}@co.io"),
            employee_id: format!("EMP00{id}"),
            department: Some("Engineering".to_string()),
        }
    }

    fn recorded(id: i64, name: &str) -> DayRecord {
        DayRecord::Recorded(AttendanceWithUser {
            record: Attendance {
                id,
                user_id: id,
                date: "2026-08-25".parse().unwrap(),
                check_in_time: "2026-08-25T09:05:00".parse().unwrap(),
                check_out_time: Some("2026-08-25T17:35:00".parse().unwrap()),
                status: AttendanceStatus::Present,
                total_hours: Some(8.5),
            },
            user: employee(id, name),
        })
    }

    #[test]
    fn header_line_is_exact_and_row_count_matches() {
        let records = vec![
            recorded(1, "Ann"),
            DayRecord::Absent(AbsentEntry::for_employee(employee(2, "Bob"))),
        ];
        let csv = attendance_csv(&records, Some("2026-08-25".parse().unwrap())).unwrap();

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "Employee ID,Name,Date,Status,Check In,Check Out,Total Hours"
        );
        assert_eq!(lines[1], "EMP001,Ann,2026-08-25,present,09:05:00,17:35:00,8.5");
        assert_eq!(lines[2], "EMP002,Bob,2026-08-25,absent,-,-,0");
    }

    #[test]
    fn embedded_comma_is_escaped_without_changing_row_count() {
        let records = vec![recorded(1, "Doe, Jane")];
        let csv = attendance_csv(&records, None).unwrap();

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("\"Doe, Jane\""));

        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let row = reader.records().next().unwrap().unwrap();
        assert_eq!(row.len(), 7);
        assert_eq!(&row[1], "Doe, Jane");
    }

    #[test]
    fn empty_result_set_is_header_only() {
        let csv = attendance_csv(&[], None).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }
}
