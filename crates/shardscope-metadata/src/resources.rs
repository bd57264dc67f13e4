//! Parsing of runtime attribute strings into numbers.

const BYTES_PER_GB: f64 = 1e9;

/// CPU count from a `cpu` runtime attribute (`"2"`, `"0.5"`). Unparsable or
/// negative values yield `0.0`.
pub fn parse_cpu(value: &str) -> f64 {
  value
    .trim()
    .parse::<f64>()
    .ok()
    .filter(|cpu| cpu.is_finite() && *cpu > 0.0)
    .unwrap_or(0.0)
}

/// Memory in gigabytes from a `memory` runtime attribute.
///
/// Accepts a number followed by an optional unit, with or without a space:
/// `"2 GB"`, `"3.5 GiB"`, `"2048 MB"`, `"4G"`. Decimal units are powers of
/// 1000 and `i` units powers of 1024. A bare number is a byte count. Anything
/// unparsable yields `0.0`.
pub fn parse_memory_gb(value: &str) -> f64 {
  let value = value.trim();
  let split = value
    .find(|c: char| !(c.is_ascii_digit() || c == '.'))
    .unwrap_or(value.len());
  let (amount, unit) = value.split_at(split);

  let Ok(amount) = amount.parse::<f64>() else {
    return 0.0;
  };

  let bytes_per_unit = match unit.trim().to_ascii_lowercase().as_str() {
    "" | "b" => 1.0,
    "k" | "kb" => 1e3,
    "m" | "mb" => 1e6,
    "g" | "gb" => 1e9,
    "t" | "tb" => 1e12,
    "ki" | "kib" => 1024.0,
    "mi" | "mib" => 1024.0 * 1024.0,
    "gi" | "gib" => 1024.0 * 1024.0 * 1024.0,
    "ti" | "tib" => 1024.0 * 1024.0 * 1024.0 * 1024.0,
    _ => return 0.0,
  };

  amount * bytes_per_unit / BYTES_PER_GB
}

/// Total disk size in gigabytes from a `disks` runtime attribute.
///
/// The attribute is a comma separated list of `<mount> <size> <type>` entries
/// such as `"local-disk 10 HDD, /mnt/data 100 SSD"`. The first numeric token of
/// each entry is its size.
pub fn parse_disk_gb(value: &str) -> f64 {
  value
    .split(',')
    .filter_map(|disk| {
      disk
        .split_whitespace()
        .find_map(|token| token.parse::<f64>().ok())
    })
    .filter(|size| size.is_finite() && *size > 0.0)
    .sum()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
  }

  #[test]
  fn test_parse_cpu() {
    assert_eq!(parse_cpu("2"), 2.0);
    assert_eq!(parse_cpu(" 0.5 "), 0.5);
    assert_eq!(parse_cpu(""), 0.0);
    assert_eq!(parse_cpu("-1"), 0.0);
    assert_eq!(parse_cpu("many"), 0.0);
  }

  #[test]
  fn test_parse_memory_units() {
    assert!(close(parse_memory_gb("2 GB"), 2.0));
    assert!(close(parse_memory_gb("2048 MB"), 2.048));
    assert!(close(parse_memory_gb("4G"), 4.0));
    assert!(close(parse_memory_gb("1 GiB"), 1.073741824));
    assert!(close(parse_memory_gb("3.5 gb"), 3.5));
    assert!(close(parse_memory_gb("1000000000"), 1.0));
  }

  #[test]
  fn test_parse_memory_invalid() {
    assert_eq!(parse_memory_gb(""), 0.0);
    assert_eq!(parse_memory_gb("lots"), 0.0);
    assert_eq!(parse_memory_gb("2 parsecs"), 0.0);
  }

  #[test]
  fn test_parse_disks() {
    assert_eq!(parse_disk_gb("local-disk 10 HDD"), 10.0);
    assert_eq!(parse_disk_gb("local-disk 10 HDD, /mnt/data 100 SSD"), 110.0);
    assert_eq!(parse_disk_gb(""), 0.0);
  }
}
