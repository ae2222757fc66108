/// Format an amount the Dutch way: \u{20ac}1.234,56 with a dot for thousands
/// and a comma for cents.
pub fn euro(val: f64) -> String {
    let negative = val < 0.0;
    let cents = format!("{:.2}", val.abs());
    let parts: Vec<&str> = cents.split('.').collect();
    let int_part = parts[0];
    let dec_part = parts[1];

    let mut with_seps = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_seps.push('.');
        }
        with_seps.push(c);
    }
    let with_seps: String = with_seps.chars().rev().collect();

    if negative {
        format!("-\u{20ac}{with_seps},{dec_part}")
    } else {
        format!("\u{20ac}{with_seps},{dec_part}")
    }
}
