//! Request paths and their parameters.

use ifcvox_raster::LayerColor;

use crate::RequestError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    fn parse(s: &str) -> Result<Self, RequestError> {
        match s {
            "x" => Ok(Self::X),
            "y" => Ok(Self::Y),
            "z" => Ok(Self::Z),
            _ => Err(RequestError::BadRequest(format!("unknown axis {s:?}"))),
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// The result families whose files are served from a job directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckKind {
    SafetyBarriers,
    EvacuationRoutes,
    Run,
}

impl CheckKind {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "safetybarriers" => Some(Self::SafetyBarriers),
            "evacuationroutes" => Some(Self::EvacuationRoutes),
            "run" => Some(Self::Run),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Health,
    Info {
        job: String,
        num: u32,
    },
    Slice {
        job: String,
        num: u32,
        axis: Axis,
        offset: usize,
    },
    CountSlice {
        job: String,
        num: u32,
        axis: Axis,
        offset: usize,
    },
    MultiSlice {
        job: String,
        background: LayerColor,
        axis: Axis,
        offset: usize,
        layers: Vec<(u32, LayerColor)>,
    },
    Progress {
        job: String,
    },
    SafetyBarrierProgress {
        job: String,
    },
    Log {
        job: String,
    },
    File {
        check: CheckKind,
        job: String,
        part: String,
    },
}

impl Route {
    /// Matches a request URL. The query string is ignored.
    pub fn parse(url: &str) -> Result<Self, RequestError> {
        let path = url.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let route = match segments[..] {
            ["health"] => Self::Health,
            ["info", job, num] => Self::Info {
                job: job_id(job)?,
                num: number(num)?,
            },
            ["slice", job, num, axis, offset] => Self::Slice {
                job: job_id(job)?,
                num: number(num)?,
                axis: Axis::parse(axis)?,
                offset: number(offset)?,
            },
            ["count_slice", job, num, axis, offset] => Self::CountSlice {
                job: job_id(job)?,
                num: number(num)?,
                axis: Axis::parse(axis)?,
                offset: number(offset)?,
            },
            ["multi_slice", job, background, axis, offset, ref layers @ ..] => {
                let job = job_id(job)?;
                if layers.is_empty() || layers.len() % 2 != 0 {
                    return Err(RequestError::BadRequest(
                        "expected <num>/<color> pairs after the offset".into(),
                    ));
                }
                let layers = layers
                    .chunks_exact(2)
                    .map(|pair| Ok((number::<u32>(pair[0])?, LayerColor::parse(pair[1])?)))
                    .collect::<Result<Vec<_>, RequestError>>()?;
                Self::MultiSlice {
                    job,
                    background: LayerColor::parse(background)?,
                    axis: Axis::parse(axis)?,
                    offset: number(offset)?,
                    layers,
                }
            }
            ["progress", job] => Self::Progress { job: job_id(job)? },
            ["log", job] => Self::Log { job: job_id(job)? },
            ["safetybarriers", job, "progress"] => Self::SafetyBarrierProgress { job: job_id(job)? },
            [check, job, part] => {
                let check = CheckKind::parse(check)
                    .ok_or_else(|| RequestError::NotFound(format!("no route for {path}")))?;
                Self::File {
                    check,
                    job: job_id(job)?,
                    part: part.to_string(),
                }
            }
            _ => return Err(RequestError::NotFound(format!("no route for {path}"))),
        };
        Ok(route)
    }
}

/// Job ids are generated from ASCII letters only; anything else cannot name
/// a job directory.
fn job_id(s: &str) -> Result<String, RequestError> {
    if !s.is_empty() && s.bytes().all(|b| b.is_ascii_alphabetic()) {
        Ok(s.to_string())
    } else {
        Err(RequestError::NotFound(format!("invalid job id {s:?}")))
    }
}

fn number<T: std::str::FromStr>(s: &str) -> Result<T, RequestError> {
    s.parse()
        .map_err(|_| RequestError::BadRequest(format!("invalid number {s:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_routes() {
        assert_eq!(Route::parse("/health").unwrap(), Route::Health);
        assert_eq!(
            Route::parse("/slice/abc/2/z/17?cache=no").unwrap(),
            Route::Slice {
                job: "abc".into(),
                num: 2,
                axis: Axis::Z,
                offset: 17
            }
        );
        assert!(matches!(
            Route::parse("/count_slice/abc/0/y/0").unwrap(),
            Route::CountSlice { axis: Axis::Y, .. }
        ));
    }

    #[test]
    fn test_multi_slice_pairs() {
        let route = Route::parse("/multi_slice/job/eeeeee/x/280/4/888888/16/ff000080").unwrap();
        let Route::MultiSlice {
            background, layers, ..
        } = route
        else {
            panic!("expected multi_slice, got {route:?}");
        };
        assert_eq!(background.rgb, [0xee; 3]);
        assert_eq!(layers.len(), 2);
        assert_eq!(layers[0].0, 4);
        assert_eq!(layers[1].1.alpha, Some(0x80));

        let err = Route::parse("/multi_slice/job/eeeeee/x/280/4").unwrap_err();
        assert_eq!(err.status(), 400);
        let err = Route::parse("/multi_slice/job/eeeeee/x/280/4/88").unwrap_err();
        assert_eq!(err.status(), 400);
    }

    #[test]
    fn test_job_ids_must_be_letters() {
        for url in ["/info/ab1/0", "/progress/..", "/run/a_b/annotation", "/log/%2e%2e"] {
            assert_eq!(Route::parse(url).unwrap_err().status(), 404, "{url}");
        }
    }

    #[test]
    fn test_bad_parameters() {
        assert_eq!(Route::parse("/slice/abc/0/w/1").unwrap_err().status(), 400);
        assert_eq!(Route::parse("/slice/abc/0/x/-1").unwrap_err().status(), 400);
        assert_eq!(Route::parse("/info/abc/two").unwrap_err().status(), 400);
    }

    #[test]
    fn test_file_routes() {
        assert_eq!(
            Route::parse("/evacuationroutes/abc/metadata").unwrap(),
            Route::File {
                check: CheckKind::EvacuationRoutes,
                job: "abc".into(),
                part: "metadata".into()
            }
        );
        assert_eq!(
            Route::parse("/safetybarriers/abc/progress").unwrap(),
            Route::SafetyBarrierProgress { job: "abc".into() }
        );
        assert_eq!(Route::parse("/volume/abc/annotation").unwrap_err().status(), 404);
        assert_eq!(Route::parse("/").unwrap_err().status(), 404);
    }
}
