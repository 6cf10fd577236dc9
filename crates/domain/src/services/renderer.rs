//! Badge group renderer.
//!
//! Turns a group's settings into an HTML fragment plus a `<style>` block
//! scoped to the fragment's container id. Rendering is pure: the same
//! catalog, options and settings always produce the same output.

use crate::models::{
    Animation, BadgeGroup, BadgeSettings, Placement, ResolvedSettings,
};

use super::catalog::BadgeCatalog;

/// Viewport width from which the desktop badge size applies.
pub const DESKTOP_BREAKPOINT_PX: u32 = 768;

/// Stagger between consecutive badge animations, in seconds.
pub const STAGGER_SECS: f32 = 0.1;

/// Rendering options that do not vary per group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Prefix for element ids, class names and keyframe names.
    pub namespace: String,
    /// Base URL badge image file names are resolved against.
    pub asset_base_url: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            namespace: "trust-badges".to_string(),
            asset_base_url: "/assets/badges".to_string(),
        }
    }
}

/// Output of a render: the markup and the CSS scoped to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFragment {
    pub container_id: String,
    pub html: String,
    pub css: String,
}

impl RenderedFragment {
    /// HTML followed by its `<style>` block, ready to insert into a page.
    pub fn to_markup(&self) -> String {
        format!("{}\n<style>\n{}</style>\n", self.html, self.css)
    }
}

pub struct BadgeRenderer<'a> {
    catalog: &'a BadgeCatalog,
    options: &'a RenderOptions,
}

impl<'a> BadgeRenderer<'a> {
    pub fn new(catalog: &'a BadgeCatalog, options: &'a RenderOptions) -> Self {
        Self { catalog, options }
    }

    /// Renders a stored group. Inactive groups render nothing.
    pub fn render_group(&self, group: &BadgeGroup) -> Option<RenderedFragment> {
        if !group.is_active {
            return None;
        }
        Some(self.render(&group.id, &group.badge_settings()))
    }

    pub fn render(&self, group_id: &str, settings: &BadgeSettings) -> RenderedFragment {
        let resolved = settings.resolve();
        let placement = Placement::from_group_id(group_id);
        let container_id = format!("{}-{}", self.options.namespace, group_id);

        let html = self.render_html(&container_id, &placement, &resolved);
        let css = self.render_css(&container_id, &placement, &resolved);

        RenderedFragment {
            container_id,
            html,
            css,
        }
    }

    fn class(&self, name: &str) -> String {
        format!("{}-{}", self.options.namespace, name)
    }

    fn render_html(
        &self,
        container_id: &str,
        placement: &Placement,
        settings: &ResolvedSettings,
    ) -> String {
        let ns = &self.options.namespace;
        let mut classes = vec![
            format!("{ns}-container"),
            format!("align-{}", settings.badge_alignment.as_str()),
            format!("style-{}", settings.badge_style.as_str()),
        ];
        if let Some(animation) = settings.animation {
            classes.push(format!("badge-{}", animation.as_str()));
        }

        let mut html = format!(
            "<div id=\"{}\" class=\"{}\">\n",
            escape_html(container_id),
            escape_html(&classes.join(" "))
        );

        let is_footer = matches!(placement, Placement::Footer);
        if is_footer {
            html.push_str(&format!("<div class=\"{}\">\n", self.class("wrapper")));
        }
        html.push_str(&format!("<div class=\"{}\">\n", self.class("content")));

        if settings.show_header {
            html.push_str(&format!(
                "<div class=\"{}\">{}</div>\n",
                self.class("header"),
                escape_html(&settings.header_text)
            ));
        }

        html.push_str(&format!("<div class=\"{}\">\n", self.class("badges")));
        let mut index = 0usize;
        for badge_id in &settings.selected_badges {
            let Some(entry) = self.catalog.lookup(badge_id) else {
                tracing::debug!(badge_id = %badge_id, "Skipping badge missing from catalog");
                continue;
            };

            let mut style = format!("--badge-index: {index};");
            if let Some(m) = settings.margin {
                style.push_str(&format!(
                    " margin: {}px {}px {}px {}px;",
                    m.top, m.right, m.bottom, m.left
                ));
            }

            let src = format!(
                "{}/{}",
                self.options.asset_base_url.trim_end_matches('/'),
                entry.image_file_name
            );
            let content = if settings.badge_style.is_mono() {
                format!(
                    "<span class=\"{}\" role=\"img\" aria-label=\"{}\" style=\"background-color: {}; -webkit-mask-image: url('{}'); mask-image: url('{}');\"></span>",
                    self.class("mono"),
                    escape_html(&entry.display_name),
                    escape_html(&settings.badge_color),
                    escape_html(&src),
                    escape_html(&src)
                )
            } else {
                format!(
                    "<img src=\"{}\" alt=\"{}\" width=\"{}\" loading=\"lazy\">",
                    escape_html(&src),
                    escape_html(&entry.display_name),
                    settings.size_mobile_px
                )
            };

            html.push_str(&format!(
                "<div class=\"{}\" data-badge=\"{}\" style=\"{}\">{}</div>\n",
                self.class("badge"),
                escape_html(&entry.id),
                style,
                content
            ));
            index += 1;
        }
        html.push_str("</div>\n</div>\n");
        if is_footer {
            html.push_str("</div>\n");
        }
        html.push_str("</div>");

        html
    }

    fn render_css(
        &self,
        container_id: &str,
        placement: &Placement,
        settings: &ResolvedSettings,
    ) -> String {
        let ns = &self.options.namespace;
        let root = format!("#{container_id}");
        let badge = format!("{root} .{ns}-badge");
        let mut css = String::new();

        css.push_str(&format!(
            "{root} {{ margin: {}px 0; }}\n",
            settings.container_margin
        ));

        if let Placement::Footer = placement {
            css.push_str(&format!(
                "{root} .{ns}-wrapper {{ display: flex; justify-content: {}; }}\n",
                settings.position.justify_content()
            ));
        }

        css.push_str(&format!(
            "{root} .{ns}-header {{ font-size: {}px; color: {}; text-align: {}; margin-bottom: 10px; }}\n",
            settings.font_size,
            settings.text_color,
            settings.alignment.as_str()
        ));

        css.push_str(&format!(
            "{root} .{ns}-badges {{ display: flex; flex-wrap: wrap; align-items: center; gap: {}px; justify-content: {}; }}\n",
            settings.badge_gap,
            settings.badge_alignment.justify_content()
        ));
        css.push_str(&format!(
            "{root}.align-left .{ns}-badges {{ justify-content: flex-start; }}\n"
        ));
        css.push_str(&format!(
            "{root}.align-center .{ns}-badges {{ justify-content: center; }}\n"
        ));
        css.push_str(&format!(
            "{root}.align-right .{ns}-badges {{ justify-content: flex-end; }}\n"
        ));

        // Mobile first; the desktop size takes over at the breakpoint.
        css.push_str(&format!(
            "{badge} {{ display: inline-flex; align-items: center; justify-content: center; transition: {}; }}\n",
            settings.transition
        ));
        css.push_str(&format!(
            "{badge} img {{ display: block; width: {m}px; height: auto; }}\n",
            m = settings.size_mobile_px
        ));
        css.push_str(&format!(
            "{badge} .{ns}-mono {{ display: block; width: {m}px; height: {m}px; -webkit-mask-size: contain; mask-size: contain; -webkit-mask-repeat: no-repeat; mask-repeat: no-repeat; -webkit-mask-position: center; mask-position: center; }}\n",
            m = settings.size_mobile_px
        ));
        css.push_str(&format!(
            "@media (min-width: {DESKTOP_BREAKPOINT_PX}px) {{\n  {badge} img {{ width: {d}px; }}\n  {badge} .{ns}-mono {{ width: {d}px; height: {d}px; }}\n}}\n",
            d = settings.size_desktop_px
        ));

        css.push_str(&format!(
            "{badge}:hover {{ transform: {}; }}\n",
            settings.hover_transform
        ));

        if settings.badge_style.is_card() {
            css.push_str(&format!(
                "{badge} {{ background: #ffffff; padding: {}px; border-radius: {}px; box-shadow: 0 1px 3px rgba(0, 0, 0, 0.1); }}\n",
                settings.badge_padding,
                settings.border_radius
            ));
        }

        match settings.animation {
            Some(animation) => {
                css.push_str(&format!(
                    "{root}.badge-{name} .{ns}-badge {{ opacity: 0; animation: {ns}-{name} {timing} forwards; animation-delay: calc(var(--badge-index) * {STAGGER_SECS}s); }}\n",
                    name = animation.as_str(),
                    timing = animation_timing(animation)
                ));
                css.push_str(&keyframes(ns, animation));
            }
            None => css.push_str(&format!("{badge} {{ opacity: 1; }}\n")),
        }

        css
    }
}

/// Duration and timing function of each entrance animation.
pub fn animation_timing(animation: Animation) -> &'static str {
    match animation {
        Animation::Fade | Animation::Slide | Animation::Scale => "0.5s ease",
        Animation::Bounce => "0.6s cubic-bezier(0.36, 0, 0.66, -0.56)",
    }
}

fn keyframes(ns: &str, animation: Animation) -> String {
    let name = animation.as_str();
    let body = match animation {
        Animation::Fade => "  from { opacity: 0; }\n  to { opacity: 1; }\n",
        Animation::Slide => {
            "  from { opacity: 0; transform: translateY(20px); }\n  to { opacity: 1; transform: translateY(0); }\n"
        }
        Animation::Scale => {
            "  from { opacity: 0; transform: scale(0.8); }\n  to { opacity: 1; transform: scale(1); }\n"
        }
        Animation::Bounce => {
            "  0% { opacity: 0; transform: scale(0.3); }\n  50% { opacity: 0.9; transform: scale(1.1); }\n  80% { opacity: 1; transform: scale(0.89); }\n  100% { opacity: 1; transform: scale(1); }\n"
        }
    };
    format!("@keyframes {ns}-{name} {{\n{body}}}\n")
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
