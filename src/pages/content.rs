//! The portfolio content served on each page.

use super::place::{boxed, center_lines, join_vertical, place_horizontal, place_vertical, wrap_words};
use super::{ContentProvider, Page};
use crate::error::Result;
use crate::ui::theme::Theme;
use ratatui::layout::Size;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};

/// Rows the landing and resume pages are centered in, independent of the
/// viewport height.
const LANDING_ROWS: u16 = 20;

/// Inner width of a project card.
const CARD_WIDTH: usize = 48;

/// Column width of the About bio paragraph.
const BIO_WIDTH: usize = 44;

const BANNER: [&str; 3] = [
    "-----------------------------",
    "Welcome to ssh l0calhost.xyz ",
    "-----------------------------",
];

const BUNNY: [&str; 3] = ["(\\__/) ||", "(•ㅅ•) ||", "/    づ"];

const NAVIGATION_HELP: &str = "Navigation: Arrow Keys + Enter • Quit: Ctrl + C or q";

const BIO: &str = "I've been programming and competing in hackathons for over 7 years, \
    mostly experienced in Web Development, Devops and AI but I'm always exploring new tech \
    that I find interesting.";

const RESUME_NOTE: &str = "Hi, I'm still trying to figure out a way to render a pdf in a \
    terminal. Until then you can view it here:";

const RESUME_URL: &str = "https://l0calhost.xyz/resume.html";

struct Project {
    title: &'static str,
    description: &'static str,
    technologies: &'static str,
    link: &'static str,
}

const PROJECTS: [Project; 5] = [
    Project {
        title: "DocConnect",
        description: "A healthcare app for doctors integrating management, collaboration, and AI-driven insights.",
        technologies: "React, NodeJs, Google Cloud, Docker",
        link: "github.com/siddhantsingh9811/doc-connect",
    },
    Project {
        title: "Zelto",
        description: "A student-focused scooty rental app enabling easy ride booking and price comparison.",
        technologies: "React, NodeJs, ExpressJs, PWAs, Docker",
        link: "github.com/siddhantsingh9811/zelto-frontend",
    },
    Project {
        title: "Kat Social Media",
        description: "A simple social media application inspired by twitter (back when it wasnt.. well whatever it is now)",
        technologies: "React, NodeJs, Strapi, Vercel, Nginx",
        link: "github.com/siddhantsingh9811/kat-social-media",
    },
    Project {
        title: "Document Classification Model",
        description: "A CNN-based document classification model developed while at Eisenvault, achieving 92% accuracy.",
        technologies: "Tensorflow, Pandas, Google Colab, FastAPI",
        link: "github.com/siddhantsingh9811/document-classification-model",
    },
    Project {
        title: "Pomodoro Timer",
        description: "A pomodoro timer i coded to help with studying instead of actually studying.",
        technologies: "React, NodeJs, PWAs, Vercel",
        link: "github.com/siddhantsingh9811/pomodoro",
    },
];

/// (label, label color, handle, target)
const CONTACTS: [(&str, Option<Color>, &str, &str); 5] = [
    (
        "Github: ",
        None,
        "@siddhantsingh9811",
        "https://github.com/siddhantsingh9811",
    ),
    (
        "Email: ",
        None,
        "ssiddhant9811@gmail.com",
        "mailto:ssiddhant9811@gmail.com",
    ),
    (
        "Whatsapp: ",
        Some(Color::Rgb(95, 244, 117)),
        "+91 9711990554",
        "https://api.whatsapp.com/send/?phone=919711990554&text&type=phone_number&app_absent=0",
    ),
    (
        "Instagram: ",
        Some(Color::Rgb(231, 42, 128)),
        "@siddhant_219",
        "https://www.instagram.com/siddhant_219",
    ),
    (
        "Linkedin: ",
        Some(Color::Rgb(12, 211, 255)),
        "@siddhant-singh-3b94371b2",
        "https://www.linkedin.com/in/siddhant-singh-3b94371b2",
    ),
];

/// The built-in [`ContentProvider`]: fixed portfolio text styled with a theme.
#[derive(Debug, Clone, Copy)]
pub struct PortfolioContent {
    theme: &'static Theme,
}

impl PortfolioContent {
    pub fn new(theme: &'static Theme) -> Self {
        Self { theme }
    }

    fn accent_bold(&self) -> Style {
        Style::default()
            .fg(self.theme.accent)
            .add_modifier(Modifier::BOLD)
    }

    /// Landing page: banner, art and key help, each centered across the viewport.
    pub fn home(&self, viewport: Size) -> Text<'static> {
        let banner_style = Style::default().fg(self.theme.banner);
        let art_style = Style::default().fg(self.theme.accent);

        let banner = Text::from(
            BANNER
                .iter()
                .map(|l| Line::styled(*l, banner_style))
                .collect::<Vec<_>>(),
        );
        let bunny = Text::from(
            BUNNY
                .iter()
                .map(|l| Line::styled(*l, art_style))
                .collect::<Vec<_>>(),
        );
        let help = Text::from(Line::styled(
            NAVIGATION_HELP,
            Style::default().fg(self.theme.fg_dim),
        ));

        let text = join_vertical([
            Text::from(Line::default()),
            place_horizontal(banner, viewport.width),
            Text::from(Line::default()),
            place_horizontal(bunny, viewport.width),
            Text::from(Line::default()),
            place_horizontal(help, viewport.width),
        ]);
        place_vertical(text, LANDING_ROWS)
    }

    pub fn about(&self, viewport: Size) -> Text<'static> {
        let mut lines = vec![Line::from(vec![
            Span::raw("Hi, I'm "),
            Span::styled("Siddhant Singh", self.accent_bold()),
        ])];
        lines.push(Line::default());
        lines.extend(wrap_words(BIO, BIO_WIDTH).into_iter().map(Line::from));
        lines.push(Line::default());
        let intro = Text::from(lines);

        let credit = Text::from(Line::from(vec![
            Span::raw("Made with "),
            Span::styled(
                "Ratatui ",
                Style::default()
                    .fg(self.theme.highlight)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("in "),
            Span::styled("Rust", self.accent_bold()),
        ]));

        let block = center_lines(join_vertical([intro, credit]));
        place_vertical(place_horizontal(block, viewport.width), viewport.height)
    }

    pub fn projects(&self) -> Text<'static> {
        let mut blocks = vec![Text::from(vec![
            Line::default(),
            Line::styled(
                "Here are some of the projects I have worked on.",
                self.accent_bold(),
            ),
            Line::default(),
        ])];
        blocks.extend(PROJECTS.iter().map(|p| self.project_card(p)));
        join_vertical(blocks)
    }

    fn project_card(&self, project: &Project) -> Text<'static> {
        let tech_style = Style::default()
            .fg(self.theme.banner)
            .add_modifier(Modifier::BOLD);

        let mut lines = vec![Line::styled(project.title, self.accent_bold())];
        lines.push(Line::default());
        lines.extend(
            wrap_words(project.description, CARD_WIDTH)
                .into_iter()
                .map(Line::from),
        );
        lines.push(Line::default());
        lines.push(Line::styled("Technologies:", tech_style));
        lines.extend(
            wrap_words(project.technologies, CARD_WIDTH)
                .into_iter()
                .map(Line::from),
        );
        let link_style = Style::default()
            .fg(self.theme.link)
            .add_modifier(Modifier::UNDERLINED);
        lines.extend(
            split_link(project.link, CARD_WIDTH)
                .into_iter()
                .map(|part| Line::styled(part, link_style)),
        );

        boxed(lines, CARD_WIDTH, Style::default().fg(self.theme.banner))
    }

    pub fn contact(&self, viewport: Size) -> Text<'static> {
        let link_style = Style::default()
            .fg(self.theme.link)
            .add_modifier(Modifier::UNDERLINED);

        let mut lines = vec![
            Line::styled("Contact me:", self.accent_bold()),
            Line::styled("You can reach me here", Style::default().fg(self.theme.fg_dim)),
            Line::default(),
        ];
        for (label, color, handle, target) in CONTACTS {
            let label_style = match color {
                Some(c) => Style::default().fg(c).add_modifier(Modifier::BOLD),
                None => Style::default(),
            };
            lines.push(Line::from(vec![
                Span::styled(label, label_style),
                Span::raw(handle),
            ]));
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(target, link_style),
            ]));
        }

        place_vertical(place_horizontal(Text::from(lines), viewport.width), viewport.height)
    }

    pub fn resume(&self) -> Text<'static> {
        let mut lines: Vec<Line<'static>> = wrap_words(RESUME_NOTE, CARD_WIDTH)
            .into_iter()
            .map(Line::from)
            .collect();
        lines.push(Line::styled(
            RESUME_URL,
            Style::default()
                .fg(self.theme.link)
                .add_modifier(Modifier::UNDERLINED),
        ));
        place_vertical(Text::from(lines), LANDING_ROWS)
    }
}

/// Break a link after its last `/` when it does not fit in `width` columns.
fn split_link(link: &'static str, width: usize) -> Vec<&'static str> {
    if link.len() <= width {
        return vec![link];
    }
    match link.rfind('/') {
        Some(i) => vec![&link[..=i], &link[i + 1..]],
        None => vec![link],
    }
}

impl ContentProvider for PortfolioContent {
    fn produce(&self, page: Page, viewport: Size) -> Result<Text<'static>> {
        Ok(match page {
            Page::Home => self.home(viewport),
            Page::About => self.about(viewport),
            Page::Projects => self.projects(),
            Page::Contact => self.contact(viewport),
            Page::Resume => self.resume(),
        })
    }
}
