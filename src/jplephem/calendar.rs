//! Julian day numbers and calendar dates

/// Calendar (year, month, day) of a Julian day number
///
/// Days before `julian_before` use the Julian calendar, the rest the
/// proleptic Gregorian calendar (Fliegel and Van Flandern).
pub fn calendar_date(jdn: i32, julian_before: Option<i32>) -> (i32, i32, i32) {
    if julian_before.is_some_and(|cutoff| jdn < cutoff) {
        let j = jdn + 1402;
        let k = (j - 1) / 1461;
        let l = j - 1461 * k;
        let n = (l - 1) / 365 - l / 1461;
        let i = l - 365 * n + 30;
        let m = 80 * i / 2447;
        let day = i - 2447 * m / 80;
        let carry = m / 11;
        return (4 * k + n + carry - 4716, m + 2 - 12 * carry, day);
    }

    let mut l = jdn + 68569;
    let n = 4 * l / 146097;
    l -= (146097 * n + 3) / 4;
    let i = 4000 * (l + 1) / 1461001;
    l = l - 1461 * i / 4 + 31;
    let m = 80 * l / 2447;
    let day = l - 2447 * m / 80;
    let carry = m / 11;
    (100 * (n - 49) + i + carry, m + 2 - 12 * carry, day)
}

/// Julian day number of a proleptic Gregorian date
pub fn julian_day_number(year: i32, month: i32, day: i32) -> i32 {
    let a = (14 - month) / 12;
    let y = year + 4800 - a;
    let m = month + 12 * a - 3;
    day + (153 * m + 2) / 5 + 365 * y + y / 4 - y / 100 + y / 400 - 32045
}

/// `YYYY-MM-DD` of the civil day containing Julian date `jd`
pub fn format_date(jd: f64) -> String {
    let (year, month, day) = calendar_date((jd + 0.5).floor() as i32, None);
    format!("{:04}-{:02}-{:02}", year, month, day)
}
