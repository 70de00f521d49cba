use eframe::egui;
use image::RgbImage;

use enhance_suite::enhance::{DEFAULT_GAMMA, GAMMA_RANGE, Method};
use enhance_suite::image_io;

pub struct EnhanceApp {
    source_image: Option<RgbImage>,
    enhanced_image: Option<RgbImage>,
    original_texture: Option<egui::TextureHandle>,
    enhanced_texture: Option<egui::TextureHandle>,
    method: Method,
    needs_process: bool,
    processing_time_ms: f64,
    last_error: Option<String>,
}

impl EnhanceApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        Self {
            source_image: None,
            enhanced_image: None,
            original_texture: None,
            enhanced_texture: None,
            method: Method::Clahe,
            needs_process: false,
            processing_time_ms: 0.0,
            last_error: None,
        }
    }

    fn open_image(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", &["jpg", "jpeg", "png"])
            .pick_file()
        else {
            return;
        };

        self.last_error = None;
        let decoded = std::fs::read(&path)
            .map_err(|e| format!("Failed to read {}: {e}", path.display()))
            .and_then(|bytes| image_io::decode(&bytes).map_err(|e| e.to_string()));

        match decoded {
            Ok(img) => {
                log::info!(
                    "loaded {} ({}x{})",
                    path.display(),
                    img.width(),
                    img.height()
                );
                self.source_image = Some(img);
                self.original_texture = None;
                self.enhanced_texture = None;
                self.enhanced_image = None;
                self.needs_process = true;
            }
            Err(e) => {
                log::warn!("{e}");
                self.last_error = Some(e);
            }
        }
    }

    fn save_result(&mut self) {
        let Some(enhanced) = &self.enhanced_image else {
            return;
        };
        let Some(path) = rfd::FileDialog::new()
            .add_filter("PNG", &["png"])
            .set_file_name("enhanced_image.png")
            .save_file()
        else {
            return;
        };

        let saved = image_io::encode_png(enhanced)
            .map_err(|e| e.to_string())
            .and_then(|bytes| {
                std::fs::write(&path, bytes)
                    .map_err(|e| format!("Failed to write {}: {e}", path.display()))
            });
        if let Err(e) = saved {
            log::warn!("{e}");
            self.last_error = Some(e);
        }
    }

    fn process_image(&mut self, ctx: &egui::Context) {
        let Some(source) = &self.source_image else {
            return;
        };

        if self.original_texture.is_none() {
            self.original_texture = Some(load_texture(ctx, "original", source));
        }

        let start = std::time::Instant::now();
        match self.method.apply(source) {
            Ok(enhanced) => {
                self.processing_time_ms = start.elapsed().as_secs_f64() * 1000.0;
                self.enhanced_texture = Some(load_texture(ctx, "enhanced", &enhanced));
                self.enhanced_image = Some(enhanced);
                self.last_error = None;
            }
            Err(e) => {
                log::warn!("enhancement failed: {e}");
                self.last_error = Some(e.to_string());
            }
        }
    }

    fn gamma_value(&self) -> f64 {
        match self.method {
            Method::GammaCorrection { gamma } => gamma,
            _ => DEFAULT_GAMMA,
        }
    }
}

fn load_texture(ctx: &egui::Context, name: &str, img: &RgbImage) -> egui::TextureHandle {
    let size = [img.width() as usize, img.height() as usize];
    let color_image = egui::ColorImage::from_rgb(size, img.as_raw());
    ctx.load_texture(name, color_image, egui::TextureOptions::LINEAR)
}

fn fit_size(available: egui::Vec2, img_w: f32, img_h: f32) -> egui::Vec2 {
    let scale = f32::min(available.x / img_w, available.y / img_h).min(1.0);
    egui::vec2(img_w * scale, img_h * scale)
}

impl eframe::App for EnhanceApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Top panel: file operations and method selection
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Upload Image").clicked() {
                    self.open_image();
                }

                ui.add_enabled_ui(self.enhanced_image.is_some(), |ui| {
                    if ui.button("Download Enhanced Image").clicked() {
                        self.save_result();
                    }
                });
                ui.separator();

                ui.label("Enhancement method:");
                let gamma = self.gamma_value();
                let options = [
                    Method::Clahe,
                    Method::UnsharpMask,
                    Method::GammaCorrection { gamma },
                ];
                egui::ComboBox::from_id_salt("method")
                    .selected_text(self.method.name())
                    .show_ui(ui, |ui| {
                        for option in options {
                            if ui
                                .selectable_value(&mut self.method, option, option.name())
                                .clicked()
                            {
                                self.needs_process = true;
                            }
                        }
                    });

                if let Method::GammaCorrection { gamma } = &mut self.method {
                    if ui
                        .add(
                            egui::Slider::new(gamma, GAMMA_RANGE)
                                .step_by(0.1)
                                .text("Gamma Value"),
                        )
                        .changed()
                    {
                        self.needs_process = true;
                    }
                }

                ui.separator();
                if let Some(source) = &self.source_image {
                    ui.label(format!(
                        "{}x{} | {:.0}ms",
                        source.width(),
                        source.height(),
                        self.processing_time_ms
                    ));
                }
            });
        });

        if self.needs_process && self.source_image.is_some() {
            self.process_image(ctx);
            self.needs_process = false;
        }

        // Central panel: original and enhanced side by side
        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(e) = &self.last_error {
                ui.colored_label(egui::Color32::LIGHT_RED, e);
            }

            match (&self.original_texture, &self.enhanced_texture) {
                (Some(original), Some(enhanced)) => {
                    let source = self.source_image.as_ref().expect("texture implies image");
                    let img_w = source.width() as f32;
                    let img_h = source.height() as f32;
                    ui.columns(2, |cols| {
                        let half = cols[0].available_size();
                        let size = fit_size(half, img_w, img_h);
                        cols[0].vertical_centered(|ui| {
                            ui.image(egui::load::SizedTexture::new(original.id(), size));
                            ui.label("Original Image");
                        });
                        cols[1].vertical_centered(|ui| {
                            ui.image(egui::load::SizedTexture::new(enhanced.id(), size));
                            ui.label(self.method.caption());
                        });
                    });
                }
                _ => {
                    ui.centered_and_justified(|ui| {
                        ui.label("Please upload a valid image file");
                    });
                }
            }
        });
    }
}
