use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

const CLOUD_BUMP_RADIUS: f64 = 12.0;

/// Smallest rectangle covering `rects`, grown by `padding` on every side.
/// An empty input still yields a `2 * padding` square at the origin.
pub fn bounding_box(rects: &[Rect], padding: f64) -> Rect {
    if rects.is_empty() {
        return Rect::new(0.0, 0.0, padding * 2.0, padding * 2.0);
    }

    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for rect in rects {
        min_x = min_x.min(rect.x);
        min_y = min_y.min(rect.y);
        max_x = max_x.max(rect.x + rect.width);
        max_y = max_y.max(rect.y + rect.height);
    }

    Rect::new(
        min_x - padding,
        min_y - padding,
        max_x - min_x + padding * 2.0,
        max_y - min_y + padding * 2.0,
    )
}

/// Where the ray from the centre of `rect` toward `from` leaves the rectangle.
///
/// Connector endpoints are anchored here so lines stop at note borders.
pub fn ray_rect_intersection(from: Point, rect: &Rect) -> Point {
    let center = rect.center();
    let half_w = rect.width / 2.0;
    let half_h = rect.height / 2.0;
    let dx = from.x - center.x;
    let dy = from.y - center.y;

    if dx == 0.0 && dy == 0.0 {
        return center;
    }

    let abs_dx = dx.abs();
    let abs_dy = dy.abs();
    // The edge reached first along the ray decides the scale factor.
    let scale = if abs_dy == 0.0 || abs_dx * half_h > abs_dy * half_w {
        half_w / abs_dx
    } else {
        half_h / abs_dy
    };

    Point::new(center.x + dx * scale, center.y + dy * scale)
}

/// Closed SVG path approximating a cloud around the given box.
pub fn cloud_outline(x: f64, y: f64, w: f64, h: f64) -> String {
    let r = CLOUD_BUMP_RADIUS;
    let h_bumps = bump_count(w);
    let v_bumps = bump_count(h);
    let h_step = w / h_bumps as f64;
    let v_step = h / v_bumps as f64;

    let mut d = String::new();
    let _ = write!(d, "M {} {}", fmt_num(x), fmt_num(y));

    for i in 0..h_bumps {
        let sx = x + i as f64 * h_step;
        let ex = x + (i + 1) as f64 * h_step;
        quad(&mut d, (sx + ex) / 2.0, y - r, ex, y);
    }
    for i in 0..v_bumps {
        let sy = y + i as f64 * v_step;
        let ey = y + (i + 1) as f64 * v_step;
        quad(&mut d, x + w + r, (sy + ey) / 2.0, x + w, ey);
    }
    for i in (0..h_bumps).rev() {
        let sx = x + (i + 1) as f64 * h_step;
        let ex = x + i as f64 * h_step;
        quad(&mut d, (sx + ex) / 2.0, y + h + r, ex, y + h);
    }
    for i in (0..v_bumps).rev() {
        let sy = y + (i + 1) as f64 * v_step;
        let ey = y + i as f64 * v_step;
        // The final bump lands on the starting corner.
        let ey = if i == 0 { y } else { ey };
        quad(&mut d, x - r, (sy + ey) / 2.0, x, ey);
    }

    d.push_str(" Z");
    d
}

fn bump_count(side: f64) -> usize {
    let count = (side / (CLOUD_BUMP_RADIUS * 2.0)).round();
    if count.is_finite() && count > 2.0 {
        count as usize
    } else {
        2
    }
}

fn quad(d: &mut String, cx: f64, cy: f64, x: f64, y: f64) {
    let _ = write!(
        d,
        " Q {} {} {} {}",
        fmt_num(cx),
        fmt_num(cy),
        fmt_num(x),
        fmt_num(y)
    );
}

/// Formats a coordinate with at most two decimals and no trailing zeros.
pub fn fmt_num(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let rounded = (value * 100.0).round() / 100.0;
    let text = format!("{rounded:.2}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_bounding_box_is_padding_square() {
        assert_eq!(bounding_box(&[], 40.0), Rect::new(0.0, 0.0, 80.0, 80.0));
    }

    #[test]
    fn bounding_box_adds_padding() {
        let bbox = bounding_box(&[Rect::new(0.0, 0.0, 10.0, 10.0)], 5.0);
        assert_eq!(bbox, Rect::new(-5.0, -5.0, 20.0, 20.0));

        let bbox = bounding_box(
            &[Rect::new(10.0, 20.0, 30.0, 5.0), Rect::new(-10.0, 0.0, 5.0, 50.0)],
            0.0,
        );
        assert_eq!(bbox, Rect::new(-10.0, 0.0, 50.0, 50.0));
    }

    #[test]
    fn ray_from_center_returns_center() {
        let rect = Rect::new(10.0, 10.0, 40.0, 20.0);
        assert_eq!(ray_rect_intersection(rect.center(), &rect), rect.center());
    }

    #[test]
    fn ray_hits_nearest_edge() {
        let rect = Rect::new(0.0, 0.0, 40.0, 20.0);
        // Straight right of the centre: right edge.
        assert_eq!(
            ray_rect_intersection(Point::new(100.0, 10.0), &rect),
            Point::new(40.0, 10.0)
        );
        // Straight below: bottom edge.
        assert_eq!(
            ray_rect_intersection(Point::new(20.0, 100.0), &rect),
            Point::new(20.0, 20.0)
        );
        // Steep diagonal crosses the top edge.
        let hit = ray_rect_intersection(Point::new(25.0, -40.0), &rect);
        assert!((hit.y - 0.0).abs() < 1e-4);
        assert!((hit.x - 21.0).abs() < 1e-4);
    }

    #[test]
    fn degenerate_rect_does_not_produce_nan() {
        let rect = Rect::new(5.0, 5.0, 0.0, 0.0);
        let hit = ray_rect_intersection(Point::new(50.0, 5.0), &rect);
        assert!(hit.x.is_finite() && hit.y.is_finite());
    }

    #[test]
    fn cloud_outline_closes_on_start() {
        let d = cloud_outline(0.0, 0.0, 140.0, 30.0);
        assert!(d.starts_with("M 0 0 Q"));
        assert!(d.ends_with(" 0 0 Z"));
        // 6 bumps across, 2 down each side.
        assert_eq!(d.matches('Q').count(), 6 + 2 + 6 + 2);
    }

    #[test]
    fn cloud_outline_has_two_bumps_minimum() {
        let d = cloud_outline(0.0, 0.0, 10.0, 10.0);
        assert_eq!(d.matches('Q').count(), 8);
    }

    #[test]
    fn formats_numbers_compactly() {
        assert_eq!(fmt_num(80.0), "80");
        assert_eq!(fmt_num(12.5), "12.5");
        assert_eq!(fmt_num(1.0 / 3.0), "0.33");
        assert_eq!(fmt_num(-0.001), "0");
    }
}
