use xtf2ifc_core::geom::planar_distance;
use xtf2ifc_core::model::{NodePoint, PipeRun, StandardShaft};
use xtf2ifc_core::ConversionConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataQuality {
    Green,
    Orange,
    Red,
    NotAssessed,
}

impl DataQuality {
    pub fn rgb(&self) -> [f64; 3] {
        match self {
            DataQuality::Green => [0.0, 1.0, 0.0],
            DataQuality::Orange => [1.0, 0.65, 0.0],
            DataQuality::Red => [1.0, 0.0, 0.0],
            DataQuality::NotAssessed => [0.0, 0.0, 1.0],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DataQuality::Green => "green",
            DataQuality::Orange => "orange",
            DataQuality::Red => "red",
            DataQuality::NotAssessed => "not assessed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradeScale {
    /// 0 green, 1 orange, 2 or more red.
    ThreeBucket,
    /// 0 green, anything else red.
    Binary,
}

impl GradeScale {
    pub fn grade(&self, missing: usize) -> DataQuality {
        match (self, missing) {
            (_, 0) => DataQuality::Green,
            (GradeScale::ThreeBucket, 1) => DataQuality::Orange,
            _ => DataQuality::Red,
        }
    }
}

/// Counts failed presence checks. The grade depends only on the count.
#[derive(Debug, Clone, Default)]
pub struct MissingValueCounter {
    missing: Vec<&'static str>,
}

impl MissingValueCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&mut self, is_missing: bool, what: &'static str) -> &mut Self {
        if is_missing {
            self.missing.push(what);
        }
        self
    }

    pub fn count(&self) -> usize {
        self.missing.len()
    }

    pub fn missing(&self) -> &[&'static str] {
        &self.missing
    }

    pub fn grade(&self, scale: GradeScale, enabled: bool) -> DataQuality {
        if !enabled {
            return DataQuality::NotAssessed;
        }
        scale.grade(self.count())
    }
}

pub fn shaft_checks(shaft: &StandardShaft, cfg: &ConversionConfig) -> MissingValueCounter {
    let mut counter = MissingValueCounter::new();
    counter
        .check(!shaft.diameter.surveyed, "diameter")
        .check(!shaft.height.surveyed, "height")
        .check(cfg.is_missing_invert(shaft.invert_elevation), "invert elevation");
    counter
}

pub fn classify_shaft(shaft: &StandardShaft, cfg: &ConversionConfig) -> DataQuality {
    shaft_checks(shaft, cfg).grade(GradeScale::ThreeBucket, cfg.highlight_incomplete)
}

/// The shaft built around the network element a node point belongs to.
pub fn connected_shaft<'a>(point: &NodePoint, shafts: &'a [StandardShaft]) -> Option<&'a StandardShaft> {
    let element = point.network_element.as_deref()?;
    shafts
        .iter()
        .find(|s| s.sewer_node.as_deref() == Some(element))
}

fn outside_shaft(point: &NodePoint, shaft: &StandardShaft, cfg: &ConversionConfig) -> (bool, bool) {
    let radius = shaft.diameter.meters() / 2.0;
    let planar = planar_distance(point.position, shaft.position) > radius;
    let floor = cfg.effective_invert(shaft.invert_elevation);
    let z = cfg.effective_invert(Some(point.elevation));
    let vertical = z < floor || z > floor + shaft.height.meters();
    (planar, vertical)
}

pub fn pipe_checks(
    run: &PipeRun,
    shafts: &[StandardShaft],
    cfg: &ConversionConfig,
) -> MissingValueCounter {
    let mut counter = MissingValueCounter::new();
    counter
        .check(cfg.is_missing_invert(Some(run.start.elevation)), "start elevation")
        .check(cfg.is_missing_invert(Some(run.end.elevation)), "end elevation");

    if cfg.validate_pipe_endpoints {
        let ends = [
            (&run.start, "start outside shaft footprint", "start outside shaft height"),
            (&run.end, "end outside shaft footprint", "end outside shaft height"),
        ];
        for (point, planar_label, vertical_label) in ends {
            let Some(shaft) = connected_shaft(point, shafts) else {
                continue;
            };
            let (planar, vertical) = outside_shaft(point, shaft, cfg);
            counter.check(planar, planar_label).check(vertical, vertical_label);
        }
    }
    counter
}

pub fn classify_pipe_run(
    run: &PipeRun,
    shafts: &[StandardShaft],
    cfg: &ConversionConfig,
) -> DataQuality {
    pipe_checks(run, shafts, cfg).grade(GradeScale::Binary, cfg.highlight_incomplete)
}
