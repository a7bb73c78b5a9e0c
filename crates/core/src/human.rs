/// Market cap with a magnitude suffix, e.g. `$1.23T`.
pub fn human_market_cap(cap: f64) -> String {
    let mut n = cap;
    let units = ["", "K", "M", "B", "T"];
    let mut u = 0;
    while n.abs() >= 1000.0 && u < units.len() - 1 {
        n /= 1000.0;
        u += 1;
    }
    if u == 0 {
        format!("${:.0}", n)
    } else {
        format!("${:.2}{}", n, units[u])
    }
}

pub fn signed_percent(v: f64) -> String {
    format!("{:+.2}%", v)
}

pub fn price(p: f64) -> String {
    format!("${:.2}", p)
}
