//! Bundled demo repository, served without network access.

use crate::domain::RepoRef;
use crate::error::StudioResult;
use crate::fetch::{FileContent, RepoHost};
use crate::tree::{EntryKind, RemoteEntry};
use async_trait::async_trait;

pub const DEMO_TREE_SHA: &str = "demo-tree";

/// Overview shown instead of a generated one in demo mode.
pub const DEMO_OVERVIEW: &str = "Demo repository with lazy loading functionality. Files with \
placeholder content are loaded when opened.";

const BUTTON_TSX: &str = r#"import React from 'react';
import { cn } from '@/lib/utils';

interface ButtonProps extends React.ButtonHTMLAttributes<HTMLButtonElement> {
  variant?: 'default' | 'outline' | 'ghost';
  size?: 'default' | 'sm' | 'lg';
  children: React.ReactNode;
}

export const Button: React.FC<ButtonProps> = ({
  variant = 'default',
  size = 'default',
  className,
  children,
  ...props
}) => {
  return (
    <button
      className={cn(
        "inline-flex items-center justify-center rounded-md font-medium transition-colors",
        variant === 'default' && "bg-primary text-primary-foreground hover:bg-primary/90",
        variant === 'outline' && "border border-input bg-background hover:bg-accent",
        variant === 'ghost' && "hover:bg-accent hover:text-accent-foreground",
        size === 'default' && "h-10 px-4 py-2",
        size === 'sm' && "h-9 rounded-md px-3",
        size === 'lg' && "h-11 rounded-md px-8",
        className
      )}
      {...props}
    >
      {children}
    </button>
  );
};
"#;

const INPUT_TSX: &str = r#"import React from 'react';
import { cn } from '@/lib/utils';

interface InputProps extends React.InputHTMLAttributes<HTMLInputElement> {
  error?: string;
}

export const Input = React.forwardRef<HTMLInputElement, InputProps>(
  ({ className, error, ...props }, ref) => {
    return (
      <div className="space-y-1">
        <input
          className={cn(
            "flex h-10 w-full rounded-md border border-input bg-background px-3 py-2",
            "disabled:cursor-not-allowed disabled:opacity-50",
            error && "border-destructive",
            className
          )}
          ref={ref}
          {...props}
        />
        {error && <p className="text-sm text-destructive">{error}</p>}
      </div>
    );
  }
);
Input.displayName = "Input";
"#;

const UTILS_TS: &str = r#"import { type ClassValue, clsx } from "clsx";
import { twMerge } from "tailwind-merge";

/**
 * Merge Tailwind CSS classes, deduplicating conflicts.
 */
export function cn(...inputs: ClassValue[]) {
  return twMerge(clsx(inputs));
}

/**
 * Format a file size in bytes to a human-readable string.
 */
export function formatFileSize(bytes: number): string {
  const units = ['B', 'KB', 'MB', 'GB'];
  let size = bytes;
  let unitIndex = 0;

  while (size >= 1024 && unitIndex < units.length - 1) {
    size /= 1024;
    unitIndex++;
  }

  return `${size.toFixed(1)} ${units[unitIndex]}`;
}

/**
 * Limit how often a function can be called.
 */
export function debounce<T extends (...args: any[]) => any>(
  func: T,
  wait: number
): (...args: Parameters<T>) => void {
  let timeout: NodeJS.Timeout;
  return (...args: Parameters<T>) => {
    clearTimeout(timeout);
    timeout = setTimeout(() => func(...args), wait);
  };
}
"#;

const PACKAGE_JSON: &str = r#"{
  "name": "demo-project",
  "version": "1.0.0",
  "description": "A demo project showcasing lazy loading functionality",
  "scripts": {
    "dev": "next dev",
    "build": "next build",
    "start": "next start",
    "lint": "next lint",
    "type-check": "tsc --noEmit"
  },
  "dependencies": {
    "next": "^14.0.0",
    "react": "^18.0.0",
    "react-dom": "^18.0.0",
    "tailwindcss": "^3.0.0",
    "clsx": "^2.0.0"
  },
  "devDependencies": {
    "@types/node": "^20.0.0",
    "@types/react": "^18.0.0",
    "typescript": "^5.0.0",
    "eslint": "^8.0.0"
  }
}
"#;

/// Stand-in host with a fixed small Next.js project.
#[derive(Debug, Default, Clone, Copy)]
pub struct DemoRepo;

impl DemoRepo {
    pub fn new() -> Self {
        Self
    }

    /// The fixed listing, in the order a recursive tree call returns it.
    pub fn entries() -> Vec<RemoteEntry> {
        let tree = |path: &str, sha: &str| RemoteEntry::new(path, EntryKind::Tree, sha);
        let blob = |path: &str, sha: &str| RemoteEntry::new(path, EntryKind::Blob, sha);
        vec![
            blob("README.md", "demo-readme"),
            blob("package.json", "demo-package"),
            tree("src", "demo-src"),
            tree("src/components", "demo-components"),
            blob("src/components/button.tsx", "demo-button"),
            blob("src/components/input.tsx", "demo-input"),
            tree("src/lib", "demo-lib"),
            blob("src/lib/utils.ts", "demo-utils"),
            tree("src/app", "demo-app"),
            blob("src/app/page.tsx", "demo-page"),
        ]
    }

    /// Simulated content, chosen by file name.
    pub fn content_for(path: &str) -> String {
        let path = path.trim_start_matches('/');
        let name = path.rsplit('/').next().unwrap_or(path);
        match name {
            "button.tsx" => BUTTON_TSX.to_string(),
            "input.tsx" => INPUT_TSX.to_string(),
            "utils.ts" => UTILS_TS.to_string(),
            "package.json" => PACKAGE_JSON.to_string(),
            _ => format!(
                "// Simulated content for {path}\n\
                 // Loaded on demand from the demo repository.\n\n\
                 export default function ExampleComponent() {{\n  \
                 return (\n    <div className=\"p-4\">\n      \
                 <h2 className=\"text-lg font-semibold\">Lazy Loaded Content</h2>\n      \
                 <p>File: {path}</p>\n    </div>\n  );\n}}\n"
            ),
        }
    }
}

#[async_trait]
impl RepoHost for DemoRepo {
    async fn default_branch_tree_sha(&self, _repo: &RepoRef) -> StudioResult<String> {
        Ok(DEMO_TREE_SHA.to_string())
    }

    async fn tree_recursive(&self, _repo: &RepoRef, _sha: &str) -> StudioResult<Vec<RemoteEntry>> {
        Ok(Self::entries())
    }

    async fn file_content(&self, _repo: &RepoRef, path: &str) -> StudioResult<FileContent> {
        let content = Self::content_for(path);
        Ok(FileContent { size: content.len() as u64, content, encoding: "utf-8".to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::fetch_tree;
    use crate::tree::{count_files, find_by_path, is_placeholder};

    #[tokio::test]
    async fn demo_tree_is_all_placeholders() {
        let tree = fetch_tree(&DemoRepo::new(), &RepoRef::new("demo", "demo"), None).await.unwrap();
        assert_eq!(count_files(&tree), 6);
        let button = find_by_path(&tree, "src/components/button.tsx").unwrap();
        assert_eq!(button.id, "demo-button");
        assert!(is_placeholder(button.content));
    }

    #[test]
    fn known_files_get_specific_content() {
        assert!(DemoRepo::content_for("src/components/button.tsx").contains("export const Button"));
        assert!(DemoRepo::content_for("/src/lib/utils.ts").contains("formatFileSize"));
        assert!(DemoRepo::content_for("package.json").contains("\"demo-project\""));
    }

    #[test]
    fn unknown_files_get_template() {
        let content = DemoRepo::content_for("src/app/page.tsx");
        assert!(content.contains("File: src/app/page.tsx"));
        assert!(!is_placeholder(&content));
    }
}
