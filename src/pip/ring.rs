//! Even-odd ray casting against a single ring.

use geo::LineString;

use crate::models::SkyPoint;

/// Crossing-number test of `point` against one closed ring.
///
/// A horizontal ray is cast towards increasing right ascension and every edge
/// it crosses flips the result. Edges are visited as (current, previous)
/// vertex pairs, with the last vertex joined back to the first. Points lying
/// exactly on an edge may be classified either way.
pub fn ray_cast_inside(point: SkyPoint, ring: &LineString<f64>) -> bool {
    let coords = &ring.0;
    let n = coords.len();
    if n == 0 {
        return false;
    }

    let SkyPoint { ra, dec } = point;
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (ra_x, dec_x) = (coords[i].x, coords[i].y);
        let (ra_y, dec_y) = (coords[j].x, coords[j].y);

        // Horizontal edges fail this check, so the division below never sees dec_y == dec_x
        if (dec_x > dec) != (dec_y > dec)
            && ra < (ra_y - ra_x) * (dec - dec_x) / (dec_y - dec_x) + ra_x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}
